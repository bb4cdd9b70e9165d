#[cfg(test)]
mod tests {
    use std::{path::Path, time::Duration};

    use wmi::{Guid, MethodName, Platform, Value};

    use crate::*;

    const TONGFANG: &str = "ABBC0F72-8EA1-11D1-00A0-C90629100000";

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = load_from_str("()", None).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.service_timeout, Duration::from_millis(1000));
        assert_eq!(cfg.actions, ActionTable::default());
    }

    #[test]
    fn full_config_parses() {
        let ron = format!(
            r#"(
                debug: true,
                service_timeout_ms: 250,
                actions: {{ 20: send_daemon_message(9, 1, 0), 9: sleep }},
                schemes: {{
                    "tongfang": (
                        guid_match: "{TONGFANG}",
                        events: [
                            (guid: "{TONGFANG}", notify_id: 0x1A, event_data: 1, action_id: 9),
                            (guid: "{TONGFANG}", notify_id: 0x1A, event_data: 1, action_id: 1),
                        ],
                    ),
                }},
            )"#
        );
        let cfg = load_from_str(&ron, None).unwrap();
        assert!(cfg.debug);
        assert_eq!(cfg.service_timeout, Duration::from_millis(250));
        assert_eq!(cfg.actions.get(9), Some(&Action::Sleep));
        assert_eq!(
            cfg.actions.get(20),
            Some(&Action::SendDaemonMessage(9, 1, 0))
        );
        let scheme = &cfg.schemes["tongfang"];
        assert_eq!(scheme.rules.len(), 2);
        assert_eq!(scheme.rules[1].action_id, 1);
        assert_eq!(scheme.guids(), vec![Guid::parse(TONGFANG).unwrap()]);
    }

    #[test]
    fn optional_fields_take_bare_or_wrapped_values() {
        let bare = format!(
            r#"(service_timeout_ms: 5, schemes: {{ "s": (guid_match: "{TONGFANG}", events: [
                (guid: "{TONGFANG}", notify_id: 0x1A, event_data: -1, action_id: 9),
            ]) }})"#
        );
        let wrapped = format!(
            r#"(service_timeout_ms: Some(5), schemes: {{ "s": (guid_match: Some("{TONGFANG}"), events: [
                (guid: Some("{TONGFANG}"), notify_id: Some(0x1A), event_data: Some(-1), action_id: Some(9)),
            ]) }})"#
        );
        let a = load_from_str(&bare, None).unwrap();
        let b = load_from_str(&wrapped, None).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.service_timeout, Duration::from_millis(5));
        assert_eq!(a.schemes["s"].rules[0].event_data, -1);

        let image = load_firmware_from_str(
            r#"(blocks: [(guid: "05901221-D566-11D1-B2F0-00A0C9062910", object_id: "AA", flags: 0x1)])"#,
            None,
        )
        .unwrap();
        assert_eq!(image.blocks.len(), 1);
    }

    #[test]
    fn malformed_rule_aborts_load() {
        let ron = format!(
            r#"(schemes: {{
                "tongfang": (
                    guid_match: "{TONGFANG}",
                    events: [
                        (guid: "{TONGFANG}", notify_id: 0x1A, event_data: 1, action_id: 9),
                        (guid: "{TONGFANG}", event_data: 1, action_id: 1),
                    ],
                ),
            }})"#
        );
        match load_from_str(&ron, None).unwrap_err() {
            Error::MalformedRule {
                scheme,
                index,
                message,
                ..
            } => {
                assert_eq!(scheme, "tongfang");
                assert_eq!(index, 1);
                assert!(message.contains("notify_id"), "{message}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_rule_field_is_a_parse_error() {
        let ron = format!(
            r#"(schemes: {{ "s": (guid_match: "{TONGFANG}", events: [
                (guid: "{TONGFANG}", notify: 1, event_data: 1, action_id: 1),
            ]) }})"#
        );
        let err = load_from_str(&ron, None).unwrap_err();
        match &err {
            Error::Parse { line, excerpt, .. } => {
                assert_eq!(*line, 2);
                assert!(excerpt.contains('^'));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(err.pretty().contains("line 2"));
    }

    #[test]
    fn scheme_needs_guid_match() {
        let err = load_from_str(r#"(schemes: { "s": (events: []) })"#, None).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }), "{err:?}");
    }

    #[test]
    fn scheme_selection_is_first_by_name() {
        let other = "00000000-0000-0000-0000-000000000001";
        let ron = format!(
            r#"(schemes: {{
                "b_tongfang": (guid_match: "{TONGFANG}"),
                "a_other": (guid_match: "{other}"),
                "c_tongfang": (guid_match: "{TONGFANG}"),
            }})"#
        );
        let cfg = load_from_str(&ron, None).unwrap();
        let present = Guid::parse(TONGFANG).unwrap();
        let (name, _) = cfg.select_scheme(|g| *g == present).unwrap();
        assert_eq!(name, "b_tongfang");
        assert!(cfg.select_scheme(|_| false).is_none());
    }

    #[test]
    fn path_must_be_ron() {
        let err = load_from_path(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
        assert!(err.path().is_some());
    }

    #[test]
    fn firmware_image_serves_directory_and_replies() {
        let ron = format!(
            r#"(
                blocks: [
                    (guid: "{TONGFANG}", notify_id: 0x1A, flags: 0x8),
                    (guid: "05901221-D566-11D1-B2F0-00A0C9062910", object_id: "AA", flags: 0x1),
                ],
                methods: {{ "WQAA": Integer(7) }},
                event_data: {{ 0x1A: Integer(1) }},
            )"#
        );
        let image = load_firmware_from_str(&ron, None).unwrap();
        assert_eq!(image.blocks.len(), 2);
        assert_eq!(image.blocks[0].notify_id(), Some(0x1A));
        let blob = image.directory_blob().unwrap();
        assert_eq!(blob.len(), 40);

        let platform = image.into_platform().unwrap();
        let wdg = platform
            .evaluate(MethodName::DIRECTORY, &[])
            .unwrap();
        assert_eq!(wdg, Some(Value::Buffer(blob)));
        // Unlisted methods succeed silently.
        assert_eq!(
            platform
                .evaluate(MethodName::from_bytes(*b"WE1A"), &[Value::from(1u8)])
                .unwrap(),
            None
        );
    }

    #[test]
    fn firmware_block_payload_must_match_flags() {
        for block in [
            format!(r#"(guid: "{TONGFANG}", object_id: "AA", flags: 0x8)"#),
            format!(r#"(guid: "{TONGFANG}", notify_id: 1, flags: 0x1)"#),
            format!(r#"(guid: "{TONGFANG}", object_id: "ABC", flags: 0x1)"#),
        ] {
            let ron = format!("(blocks: [{block}])");
            assert!(
                matches!(
                    load_firmware_from_str(&ron, None),
                    Err(Error::Validation { .. })
                ),
                "{block}"
            );
        }
        assert!(load_firmware_from_str("()", None).is_err());
    }
}
