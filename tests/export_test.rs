use serde_json::{json, Value};

use lameta_rocrate::graph::{audit, index_by_id, reachable_from_root};
use lameta_rocrate::model::{Handler, RocrateMapping};
use lameta_rocrate::{
    to_json_string, to_jsonld, AccessChoice, Contribution, DocumentKind, ExportTarget, Exporter,
    FieldDefinition, FileRecord, Folder, FolderKind, Person, Project, Session,
    StaticLanguageNames, VocabularyCatalog,
};

fn language_field(key: &str, property: &str, array: Option<bool>) -> FieldDefinition {
    FieldDefinition {
        rocrate: Some(RocrateMapping {
            key: Some(property.to_string()),
            handler: Some(Handler::Languages),
            array,
            ..RocrateMapping::default()
        }),
        ..FieldDefinition::new(key)
    }
}

fn session_folder(prefix: &str) -> Folder {
    Folder::new(FolderKind::Session, prefix)
        .with_field(FieldDefinition::new("title"))
        .with_field(FieldDefinition::new("date"))
        .with_field(FieldDefinition::new("access"))
        .with_field(FieldDefinition {
            vocabulary: Some("genres".into()),
            rocrate: Some(RocrateMapping {
                key: Some("ldac:linguisticGenre".into()),
                ..RocrateMapping::default()
            }),
            ..FieldDefinition::new("genre")
        })
        .with_field(language_field("languages", "ldac:subjectLanguage", None))
        .with_field(language_field("workingLanguages", "inLanguage", Some(false)))
}

fn edolo_project() -> Project {
    let mut project = Project::new(
        Folder::new(FolderKind::Project, "edolo")
            .with_property("title", "Edolo Texts")
            .with_property("archiveConfigurationName", "REAP")
            .with_property("contactPerson", "Sam Smith")
            .with_property("collectionDescription", "Recordings from Huya village")
            .with_property("country", "Papua New Guinea")
            .with_field(FieldDefinition::new("title"))
            .with_field(FieldDefinition::new("collectionDescription"))
            .with_field(FieldDefinition::new("archiveConfigurationName")),
    );

    project.access_choices.push(AccessChoice {
        id: "Strategic partners".into(),
        label: "Strategic partners".into(),
        description: "Available to partner communities".into(),
        ldac_access_category: Some("ldac:AuthorizedAccess".into()),
    });

    project.persons.push(Person::new(
        Folder::new(FolderKind::Person, "Awi_Heole")
            .with_property("name", "Awi Heole")
            .with_property("gender", "male")
            .with_property("birthYear", "1972")
            .with_property("howToContact", "PO Box 1, Tari")
            .with_field(FieldDefinition::new("name"))
            .with_field(FieldDefinition::new("gender"))
            .with_field(FieldDefinition::new("birthYear"))
            .with_field(FieldDefinition {
                pii: true,
                ..FieldDefinition::new("howToContact")
            })
            .with_field(language_field("primaryLanguage", "inLanguage", Some(true)))
            .with_file(FileRecord::new("/edolo/People/Awi_Heole/Awi_Heole_Photo.JPG"))
            .with_file(FileRecord::new("/edolo/People/Awi_Heole/Awi_Heole_Consent.pdf")),
    ));
    project.persons.push(Person::new(
        Folder::new(FolderKind::Person, "Ilawi_Amosa").with_property("name", "Ilawi Amosa"),
    ));

    project.sessions.push(
        Session::new(
            session_folder("ETR008")
                .with_property("title", "Ghosts and spirits")
                .with_property("date", "2010-06-01")
                .with_property("access", "Strategic partners")
                .with_property("genre", "dialog,dialog")
                .with_property("languages", "etr;tpi")
                .with_property("workingLanguages", "tpi")
                .with_property("location", "Huya")
                .with_file(FileRecord::new("/edolo/Sessions/ETR008/ETR008.wav"))
                .with_file(FileRecord::new("/edolo/Sessions/ETR008/ETR008 (annotations).eaf")),
        )
        .with_contribution(Contribution::new("Awi Heole", "speaker"))
        .with_contribution(Contribution::new("Ilawi Amosa", "speaker"))
        .with_contribution(Contribution::new("Hatton", "recorder")),
    );
    project.sessions.push(
        Session::new(
            session_folder("ETR009")
                .with_property("title", "Gardening")
                .with_property("date", "2010-06-02")
                .with_property("genre", "procedural_discourse")
                .with_file(FileRecord::new("/edolo/Sessions/ETR009/ETR009.mp4")),
        )
        .with_contribution(Contribution::new("Awi Heole", "speaker")),
    );

    project.description_folder = Some(
        Folder::new(FolderKind::DocumentFolder(DocumentKind::Description), "")
            .with_file(FileRecord::new("/edolo/DescriptionDocuments/protocol.pdf")),
    );
    project.other_docs_folder = Some(
        Folder::new(FolderKind::DocumentFolder(DocumentKind::Other), "")
            .with_file(FileRecord::new("/edolo/OtherDocuments/map.jpg")),
    );

    project
}

fn exporter() -> Exporter {
    Exporter::new(
        VocabularyCatalog::with_builtin(),
        StaticLanguageNames::new()
            .with("etr", "Edolo")
            .with("tpi", "Tok Pisin"),
    )
}

fn entity<'g>(graph: &'g [Value], id: &str) -> &'g Value {
    graph
        .iter()
        .find(|e| e["@id"] == id)
        .unwrap_or_else(|| panic!("no entity with @id {}", id))
}

fn count_id(graph: &[Value], id: &str) -> usize {
    graph.iter().filter(|e| e["@id"] == id).count()
}

#[test]
fn test_project_graph_passes_structure_audit() {
    let result = exporter().export_project(&edolo_project()).unwrap();
    assert_eq!(audit(&result.graph), vec![]);

    let jsonld = to_jsonld(&result);
    assert_eq!(jsonld["@context"][0], "https://w3id.org/ro/crate/1.2/context");
    assert_eq!(jsonld["@context"][1], "https://w3id.org/ldac/context");
    assert!(jsonld["@context"][2].get("ldac").is_some());
    assert!(jsonld["@context"][2].get("pcdm").is_some());
}

#[test]
fn test_license_is_normalized_and_shared() {
    let result = exporter().export_project(&edolo_project()).unwrap();
    let graph = &result.graph;

    let license_id = "#license-reap-strategic-partners";
    assert_eq!(count_id(graph, license_id), 1);
    assert_eq!(entity(graph, "#session-ETR008")["license"], json!({"@id": license_id}));
    assert_eq!(
        entity(graph, "Sessions/ETR008/ETR008.wav")["license"],
        json!({"@id": license_id})
    );
    assert_eq!(
        entity(graph, "Sessions/ETR008/ETR008%20%28annotations%29.eaf")["license"],
        json!({"@id": license_id})
    );
    assert_eq!(
        entity(graph, license_id)["ldac:access"],
        json!({"@id": "ldac:AuthorizedAccess"})
    );

    let raw = json!({"@id": "Strategic partners"});
    assert!(graph.iter().all(|e| e["license"] != raw));

    // ETR009 has no access value
    assert_eq!(
        entity(graph, "Sessions/ETR009/ETR009.mp4")["license"],
        json!({"@id": "#license-reap-public"})
    );
}

#[test]
fn test_duplicate_genre_gives_one_term() {
    let result = exporter().export_project(&edolo_project()).unwrap();
    let graph = &result.graph;

    assert_eq!(
        entity(graph, "#session-ETR008")["ldac:linguisticGenre"],
        json!([{"@id": "ldac:Dialogue"}, {"@id": "ldac:Dialogue"}])
    );
    assert_eq!(count_id(graph, "ldac:Dialogue"), 1);
    assert_eq!(
        entity(graph, "#session-ETR009")["ldac:linguisticGenre"],
        json!([{"@id": "ldac:Procedural"}])
    );
    assert_eq!(count_id(graph, "ldac:LinguisticGenreTerms"), 1);
}

#[test]
fn test_missing_languages_fall_back_to_und() {
    let result = exporter().export_project(&edolo_project()).unwrap();
    let graph = &result.graph;
    let und = json!({"@id": "https://lexvo.org/id/iso639-3/und"});

    let etr009 = entity(graph, "#session-ETR009");
    assert_eq!(etr009["inLanguage"], und);
    assert_eq!(etr009["ldac:subjectLanguage"], json!([und.clone()]));

    let etr008 = entity(graph, "#session-ETR008");
    assert_eq!(
        etr008["ldac:subjectLanguage"],
        json!([{"@id": "#language_etr"}, {"@id": "#language_tpi"}])
    );
    assert_eq!(etr008["inLanguage"], json!({"@id": "#language_tpi"}));
    assert_eq!(entity(graph, "#language_etr")["name"], "Edolo");

    let und_nodes: Vec<&Value> = graph
        .iter()
        .filter(|e| e["@type"] == "Language" && e["code"] == "und")
        .collect();
    assert_eq!(und_nodes.len(), 1);
}

#[test]
fn test_session_files_reachable_through_has_part() {
    let result = exporter().export_project(&edolo_project()).unwrap();
    let graph = &result.graph;

    let root = entity(graph, "./");
    assert_eq!(
        root["pcdm:hasMember"],
        json!([{"@id": "#session-ETR008"}, {"@id": "#session-ETR009"}])
    );
    let root_parts: Vec<&str> = root["hasPart"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["@id"].as_str())
        .collect();
    for container in ["Sessions/", "DescriptionDocuments/", "OtherDocuments/", "People/"] {
        assert!(root_parts.contains(&container), "root lacks {}", container);
    }

    assert_eq!(
        entity(graph, "Sessions/")["hasPart"],
        json!([{"@id": "Sessions/ETR008/"}, {"@id": "Sessions/ETR009/"}])
    );
    let directory = entity(graph, "Sessions/ETR009/");
    assert_eq!(directory["about"], json!({"@id": "#session-ETR009"}));
    assert_eq!(directory["isPartOf"], json!({"@id": "Sessions/"}));
    assert_eq!(
        entity(graph, "#session-ETR009")["subjectOf"],
        json!({"@id": "Sessions/ETR009/"})
    );
    assert!(entity(graph, "#session-ETR009").get("hasPart").is_none());

    let index = index_by_id(graph);
    let reachable = reachable_from_root(&index);
    for file in [
        "Sessions/ETR008/ETR008.wav",
        "Sessions/ETR009/ETR009.mp4",
        "People/Awi_Heole/Awi_Heole_Photo.JPG",
        "DescriptionDocuments/protocol.pdf",
        "OtherDocuments/map.jpg",
    ] {
        assert!(reachable.contains(file), "{} is not reachable", file);
    }

    let members_with_members = graph
        .iter()
        .filter(|e| e["@id"] != "./" && e.get("pcdm:hasMember").is_some())
        .count();
    assert_eq!(members_with_members, 0);
}

#[test]
fn test_speaker_roles() {
    let result = exporter().export_project(&edolo_project()).unwrap();
    let graph = &result.graph;

    let etr008 = entity(graph, "#session-ETR008");
    assert_eq!(
        etr008["ldac:speaker"],
        json!([{"@id": "People/Awi_Heole/"}, {"@id": "People/Ilawi_Amosa/"}])
    );
    assert_eq!(etr008["ldac:recorder"], json!({"@id": "#contributor-hatton"}));
    assert_eq!(
        entity(graph, "#session-ETR009")["ldac:speaker"],
        json!({"@id": "People/Awi_Heole/"})
    );

    assert!(graph.iter().all(|e| e["@type"] != "Role"));
    assert_eq!(entity(graph, "#contributor-hatton")["@type"], "Person");
}

#[test]
fn test_people_are_ldac_safe() {
    let result = exporter().export_project(&edolo_project()).unwrap();
    let graph = &result.graph;

    let awi = entity(graph, "People/Awi_Heole/");
    assert_eq!(awi["ldac:age"], "38");
    assert_eq!(awi["gender"], "male");
    assert!(awi.get("howToContact").is_none());
    assert!(awi.get("hasPart").is_none());
    assert_eq!(awi["image"], json!({"@id": "People/Awi_Heole/Awi_Heole_Photo.JPG"}));

    let photo = entity(graph, "People/Awi_Heole/Awi_Heole_Photo.JPG");
    assert_eq!(photo["about"], json!({"@id": "People/Awi_Heole/"}));
    assert_eq!(photo["isPartOf"], json!({"@id": "#Awi_Heole-files"}));

    let files = entity(graph, "#Awi_Heole-files");
    assert_eq!(files["about"], json!({"@id": "People/Awi_Heole/"}));
    assert_eq!(files["isPartOf"], json!({"@id": "People/"}));
}

#[test]
fn test_file_license_overrides_session_access() {
    let mut project = edolo_project();
    let etr008 = &mut project.sessions[0].folder;
    etr008.files.push(
        FileRecord::new("/edolo/Sessions/ETR008/ETR008 transcript.txt")
            .with_property("access", "F: Free to All"),
    );
    etr008.files.push(
        FileRecord::new("/edolo/Sessions/ETR008/ETR008 photo.jpg")
            .with_property("license", "https://creativecommons.org/licenses/by/4.0/"),
    );

    let result = exporter().export_project(&project).unwrap();
    let graph = &result.graph;
    assert_eq!(audit(graph), vec![]);

    assert_eq!(
        entity(graph, "Sessions/ETR008/ETR008%20transcript.txt")["license"],
        json!({"@id": "#license-reap-f"})
    );
    assert_eq!(
        entity(graph, "Sessions/ETR008/ETR008%20photo.jpg")["license"],
        json!({"@id": "https://creativecommons.org/licenses/by/4.0/"})
    );
    assert_eq!(
        entity(graph, "Sessions/ETR008/ETR008.wav")["license"],
        json!({"@id": "#license-reap-strategic-partners"})
    );
    assert_eq!(
        entity(graph, "#license-reap-f")["name"],
        "REAP F: Free to All License"
    );

    let index = index_by_id(graph);
    for e in graph {
        if let Some(license) = e.get("license") {
            let id = license["@id"].as_str().unwrap();
            assert!(
                index.contains_key(id) || id.starts_with("https://"),
                "{} has license {} with no entity",
                e["@id"],
                id
            );
        }
    }
}

#[test]
fn test_unusable_birth_year_is_left_out() {
    let mut project = edolo_project();
    project.persons[0].folder.metadata.set("birthYear", "-2147483648");

    let result = exporter().export_project(&project).unwrap();
    let awi = entity(&result.graph, "People/Awi_Heole/");
    assert!(awi.get("ldac:age").is_none());
    assert_eq!(awi["name"], "Awi Heole");
}

#[test]
fn test_collection_protocol_and_root_agents() {
    let result = exporter().export_project(&edolo_project()).unwrap();
    let graph = &result.graph;

    let root = entity(graph, "./");
    assert_eq!(root["name"], "Edolo Texts");
    assert_eq!(root["description"], "Recordings from Huya village");
    assert_eq!(root["conformsTo"], json!({"@id": "https://w3id.org/ldac/profile#Collection"}));
    assert_eq!(root["holdingArchive"], json!({"@id": "#publisher-reap"}));
    assert_eq!(root["author"], json!({"@id": "#contact-sam-smith"}));
    assert_eq!(
        root["ldac:hasCollectionProtocol"],
        json!([{"@id": "#descriptionDocuments"}])
    );
    assert_eq!(entity(graph, "#publisher-reap")["@type"], "Organization");

    let protocol = entity(graph, "#descriptionDocuments");
    assert_eq!(protocol["about"], json!({"@id": "DescriptionDocuments/"}));
    assert_eq!(
        entity(graph, "DescriptionDocuments/")["subjectOf"],
        json!({"@id": "#descriptionDocuments"})
    );
    assert_eq!(
        entity(graph, "#collection-license")["ldac:access"],
        json!({"@id": "ldac:OpenAccess"})
    );
}

#[test]
fn test_export_is_deterministic() {
    let project = edolo_project();
    let exporter = exporter();
    let first = to_json_string(&exporter.export_project(&project).unwrap(), false).unwrap();
    let second = to_json_string(&exporter.export_project(&project).unwrap(), false).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_standalone_session_is_its_own_root() {
    let project = edolo_project();
    let session = &project.sessions[0];
    let result = exporter()
        .export(&project, ExportTarget::Session(session))
        .unwrap();
    let graph = &result.graph;
    assert_eq!(audit(graph), vec![]);

    let root = entity(graph, "./");
    let types = root["@type"].as_array().unwrap();
    assert!(types.contains(&json!("CollectionEvent")));
    assert_eq!(root["conformsTo"], json!({"@id": "https://w3id.org/ldac/profile#Object"}));
    assert_eq!(root["publisher"], json!({"@id": "#publisher-reap"}));
    assert_eq!(
        entity(graph, "Sessions/ETR008/ETR008.wav")["isPartOf"],
        json!({"@id": "./"})
    );
    assert_eq!(count_id(graph, "Sessions/ETR008/"), 0);
    assert_eq!(count_id(graph, "#session-ETR008"), 0);
    assert_eq!(entity(graph, "People/Awi_Heole/")["ldac:age"], "38");
    assert_eq!(result.stats.sessions, 1);
}

#[test]
fn test_person_export_is_bare_array() {
    let project = edolo_project();
    let person = &project.persons[0];
    let result = exporter()
        .export(&project, ExportTarget::Person(person))
        .unwrap();

    let jsonld = to_jsonld(&result);
    let entries = jsonld.as_array().unwrap();
    assert_eq!(entries[0]["@id"], "People/Awi_Heole/");
    assert!(entries[0].get("howToContact").is_none());
    assert!(entries
        .iter()
        .any(|e| e["@id"] == "People/Awi_Heole/Awi_Heole_Consent.pdf"
            && e["about"] == json!({"@id": "People/Awi_Heole/"})));
    assert!(entries
        .iter()
        .any(|e| e["@type"] == "Language" && e["code"] == "und"));
}

#[test]
fn test_project_from_host_json() {
    let project: Project = serde_json::from_value(json!({
        "folder": {
            "kind": "project",
            "filePrefix": "edolo",
            "metadata": {
                "title": {"text": "Edolo Texts"},
                "clan": {"text": "Hawk", "custom": true}
            }
        },
        "sessions": [{
            "folder": {
                "kind": "session",
                "filePrefix": "ETR010",
                "metadata": {"title": {"text": "Fishing"}},
                "knownFields": [{"key": "title"}],
                "files": [{"path": "/edolo/Sessions/ETR010/ETR010.wav", "size": 2048}]
            },
            "contributions": [{"personReference": "Kalu", "role": "participant"}]
        }],
        "otherDocsFolder": {
            "kind": {"documentFolder": "other"},
            "files": [{"path": "/edolo/OtherDocuments/notes.txt"}]
        }
    }))
    .unwrap();

    let result = exporter().export_project(&project).unwrap();
    let graph = &result.graph;
    assert_eq!(audit(graph), vec![]);
    assert_eq!(entity(graph, "./")["clan"], "Hawk");
    assert_eq!(entity(graph, "Sessions/ETR010/ETR010.wav")["contentSize"], 2048);
    assert_eq!(
        entity(graph, "#session-ETR010")["ldac:participant"],
        json!({"@id": "#contributor-kalu"})
    );
    assert_eq!(count_id(graph, "OtherDocuments/notes.txt"), 1);
}
