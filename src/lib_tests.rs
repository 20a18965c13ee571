#[cfg(test)]
mod integration_tests {
    use crate::actions::{ActionKind, ActionRouter, ActionSettings};
    use crate::build_router_with;
    use crate::config::TaggerConfig;
    use crate::store::{BackendOp, MemoryBackend};
    use crate::tags::{codec, Color, LocalizationTable, Tag};
    use plist::{Dictionary, Value};
    use std::path::{Path, PathBuf};

    fn build_router(entries: &[(&str, Vec<Tag>)]) -> ActionRouter<MemoryBackend> {
        let backend = MemoryBackend::new();
        for (path, tags) in entries {
            backend.insert_tags(*path, tags).unwrap();
        }
        build_router_with(backend, &TaggerConfig::default(), LocalizationTable::empty())
    }

    fn selection(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    fn stored(router: &ActionRouter<MemoryBackend>, path: &str) -> Vec<Tag> {
        router
            .reconciler()
            .store()
            .backend()
            .raw(Path::new(path))
            .map(|data| codec::decode(&data).unwrap())
            .unwrap_or_default()
    }

    fn finder_preferences(names: &[(&str, i64)]) -> Vec<u8> {
        let items = names
            .iter()
            .map(|(name, code)| {
                let mut dict = Dictionary::new();
                dict.insert("n".to_string(), Value::String(name.to_string()));
                dict.insert("l".to_string(), Value::Integer(plist::Integer::from(*code)));
                Value::Dictionary(dict)
            })
            .collect();

        let mut value = Value::Array(items);
        for key in ["FinderTags", "value", "FinderTagDict", "values"] {
            let mut dict = Dictionary::new();
            dict.insert(key.to_string(), value);
            value = Value::Dictionary(dict);
        }
        let mut data = Vec::new();
        value.to_writer_binary(&mut data).unwrap();
        data
    }

    #[test]
    fn test_clear_removes_custom_leftovers() {
        let router = build_router(&[(
            "/doc.txt",
            vec![Tag::palette(Color::Red), Tag::new(Color::Custom, "Custom")],
        )]);

        let report = router
            .dispatch(
                &ActionKind::ClearTags.identifier(),
                &ActionSettings::default(),
                &selection(&["/doc.txt"]),
            )
            .unwrap()
            .unwrap();

        assert!(report.is_success());
        assert!(router.reconciler().tags_of(Path::new("/doc.txt")).is_empty());
        assert!(stored(&router, "/doc.txt").is_empty());
    }

    #[test]
    fn test_divergent_selection_gets_single_color() {
        let router = build_router(&[
            ("/a", vec![Tag::palette(Color::Red)]),
            ("/b", vec![Tag::palette(Color::Blue)]),
        ]);
        let paths = selection(&["/a", "/b"]);
        assert!(router.reconciler().common_tags(&paths).is_empty());

        router
            .dispatch(
                &ActionKind::ColorTag(Color::Green).identifier(),
                &ActionSettings::default(),
                &paths,
            )
            .unwrap();

        assert_eq!(stored(&router, "/a"), vec![Tag::palette(Color::Green)]);
        assert_eq!(stored(&router, "/b"), vec![Tag::palette(Color::Green)]);
    }

    #[test]
    fn test_color_wheel_cycles_through_configured_slots() {
        let router = build_router(&[]);
        let paths = selection(&["/a", "/b"]);
        let wheel = ActionSettings::wheel(&[
            ("Red", true),
            ("Green", false),
            ("Orange", true),
            ("Yellow", true),
        ]);
        let action = ActionKind::ColorWheel.identifier();

        let mut seen = Vec::new();
        for _ in 0..5 {
            let report = router.dispatch(&action, &wheel, &paths).unwrap().unwrap();
            assert_eq!(report.written, paths);
            seen.push(stored(&router, "/b"));
        }

        let colors = |c: &[Color]| c.iter().copied().map(Tag::palette).collect::<Vec<_>>();
        assert_eq!(
            seen,
            vec![
                colors(&[Color::Red]),
                colors(&[Color::Orange]),
                colors(&[Color::Yellow]),
                Vec::new(),
                colors(&[Color::Red]),
            ]
        );
    }

    #[test]
    fn test_configured_default_palette() {
        let config = TaggerConfig::from_yaml("palette: [Purple, Gray]").unwrap();
        let router = build_router_with(MemoryBackend::new(), &config, LocalizationTable::empty());
        let paths = selection(&["/a"]);

        router
            .dispatch(&ActionKind::ColorWheel.identifier(), &ActionSettings::default(), &paths)
            .unwrap();
        assert_eq!(stored(&router, "/a"), vec![Tag::palette(Color::Purple)]);
    }

    #[test]
    fn test_custom_toggle_preserves_existing_tags() {
        let router = build_router(&[
            ("/a", vec![Tag::palette(Color::Red)]),
            ("/b", vec![Tag::new(Color::Red, "red")]),
        ]);
        let paths = selection(&["/a", "/b"]);
        let settings = ActionSettings::from_json(&serde_json::json!({
            "settings": { "tag": "Invoices", "color": "Yellow" }
        }));
        let action = ActionKind::CustomTag.identifier();

        router.dispatch(&action, &settings, &paths).unwrap();
        assert_eq!(
            stored(&router, "/a"),
            vec![Tag::palette(Color::Red), Tag::new(Color::Yellow, "Invoices")]
        );

        router.dispatch(&action, &settings, &paths).unwrap();
        assert_eq!(stored(&router, "/a"), vec![Tag::palette(Color::Red)]);
    }

    #[test]
    fn test_missing_custom_tag_writes_nothing() {
        let router = build_router(&[("/a", vec![Tag::palette(Color::Red)])]);
        let settings = ActionSettings::from_json(&serde_json::json!({ "settings": { "color": "Red" } }));

        let err = router
            .dispatch(&ActionKind::CustomTag.identifier(), &settings, &selection(&["/a"]))
            .unwrap_err();

        assert!(err.is_validation());
        assert!(router.reconciler().store().backend().operations().is_empty());
        assert_eq!(stored(&router, "/a"), vec![Tag::palette(Color::Red)]);
    }

    #[test]
    fn test_partial_failure_is_reported_per_entry() {
        let router = build_router(&[]);
        router.reconciler().store().backend().fail_writes_to("/locked");
        let paths = selection(&["/a", "/locked", "/c"]);

        let report = router
            .dispatch(
                &ActionKind::ColorTag(Color::Blue).identifier(),
                &ActionSettings::default(),
                &paths,
            )
            .unwrap()
            .unwrap();

        assert_eq!(report.written, selection(&["/a", "/c"]));
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].path, PathBuf::from("/locked"));

        let ops = router.reconciler().store().backend().operations();
        let clear = ops.iter().position(|op| *op == BackendOp::Clear("/c".into()));
        let write = ops.iter().position(|op| *op == BackendOp::Write("/c".into()));
        assert!(clear.unwrap() < write.unwrap());
    }

    #[test]
    fn test_localized_names_roundtrip_through_disk_preferences() {
        let temp = tempfile::tempdir().unwrap();
        let prefs = temp.path().join("com.apple.finder.plist");
        std::fs::write(&prefs, finder_preferences(&[("Rouge", 6), ("Vert", 2)])).unwrap();

        let config = TaggerConfig {
            preferences_path: Some(prefs),
            ..Default::default()
        };
        let router = build_router_with(MemoryBackend::new(), &config, config.localization_table());
        let paths = selection(&["/a"]);

        router
            .dispatch(
                &ActionKind::ColorTag(Color::Red).identifier(),
                &ActionSettings::default(),
                &paths,
            )
            .unwrap();

        assert_eq!(stored(&router, "/a"), vec![Tag::new(Color::Red, "Rouge")]);
        assert_eq!(
            router.reconciler().tags_of(Path::new("/a")),
            vec![Tag::palette(Color::Red)]
        );
        assert_eq!(
            router.title(&ActionKind::ColorTag(Color::Green).identifier(), &ActionSettings::default()),
            Some("Vert".to_string())
        );

        router
            .dispatch(
                &ActionKind::ColorTag(Color::Red).identifier(),
                &ActionSettings::default(),
                &paths,
            )
            .unwrap();
        assert!(stored(&router, "/a").is_empty());
    }
}
