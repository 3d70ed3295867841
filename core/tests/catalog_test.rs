use vocalis_core::{VoiceCatalog, VoiceIdentity, VoiceLabels};

#[test]
fn premade_order_is_fixed() {
    let catalog = VoiceCatalog::premade();
    let names: Vec<_> = catalog
        .list()
        .iter()
        .map(|v| v.display_name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["Rachel", "Domi", "Bella", "Antoni", "Elli", "Josh", "Arnold", "Adam", "Sam", "Clyde"]
    );
}

#[test]
fn find_by_id() {
    let catalog = VoiceCatalog::premade();
    let rachel = catalog.find_by_id("21m00Tcm4TlvDq8ikWAM").unwrap();
    assert_eq!(rachel.display_name, "Rachel");
    assert_eq!(rachel.category, "premade");
    assert_eq!(rachel.labels.gender, "female");
    assert_eq!(rachel.labels.age, "young_adult");
    assert!(catalog.find_by_id("rachel").is_none());
}

#[test]
fn find_by_name_ignores_case() {
    let catalog = VoiceCatalog::premade();
    assert_eq!(catalog.find_by_name("clyde").unwrap().id, "2EiwWnXFnvU5JabPnv8n");
    assert_eq!(catalog.find_by_name("CLYDE").unwrap().labels.age, "senior");
    assert!(catalog.find_by_name("Cly").is_none());
}

#[test]
fn custom_catalog_keeps_order() {
    let voice = |id: &str, name: &str| VoiceIdentity {
        id: id.into(),
        display_name: name.into(),
        description: String::new(),
        category: "cloned".into(),
        labels: VoiceLabels {
            gender: "neutral".into(),
            age: "adult".into(),
        },
    };
    let catalog = VoiceCatalog::new(vec![voice("b", "Bee"), voice("a", "Ay")]);
    assert_eq!(catalog.list()[0].id, "b");
    assert_eq!(catalog.first_page(10).len(), 2);
    assert!(VoiceCatalog::new(vec![]).is_empty());
}
