use std::fs;
use tempfile::TempDir;
use themis::config::{load_operations_file, Settings};

#[test]
fn test_load_external_configs() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();

    fs::create_dir_all(root.join("config/operations"))?;

    let themis_toml = r#"
spec = "petstore.yaml"

[server]
host = "127.0.0.1"
port = 4020

[mock]
dynamic = true
cors = false
"#;
    fs::write(root.join("themis.toml"), themis_toml)?;

    let spec_yaml = r#"
operations:
  - id: listPets
    method: get
    path: /pets
    responses:
      - code: "200"
        contents:
          - mediaType: application/json
            schema:
              type: array
              items:
                type: object
                properties:
                  name: { type: string }
"#;
    fs::write(root.join("petstore.yaml"), spec_yaml)?;

    let operation_json = r#"
{
    "id": "getPet",
    "method": "get",
    "path": "/pets/{petId}",
    "request": {
        "path": [{ "name": "petId", "required": true, "schema": { "type": "integer" } }]
    },
    "responses": [
        {
            "code": "200",
            "contents": [
                {
                    "mediaType": "application/json",
                    "examples": [{ "key": "rex", "value": { "name": "Rex" } }]
                }
            ]
        }
    ]
}
"#;
    fs::write(root.join("config/operations/get_pet.json"), operation_json)?;

    let operations_toml = r#"
[[operations]]
id = "deletePet"
method = "delete"
path = "/pets/{petId}"

[[operations.responses]]
code = "204"
"#;
    fs::write(root.join("config/operations/delete_pet.toml"), operations_toml)?;

    // Ignored: not an operations document extension
    fs::write(root.join("config/operations/README.md"), "# notes")?;

    let settings = Settings::from_root(root.to_str().unwrap())?;

    assert_eq!(settings.server.port, 4020);
    assert!(settings.mock.dynamic);
    assert!(!settings.mock.cors);
    assert!(settings.mock.validate_request);

    let mut ids: Vec<&str> = settings.operations.iter().map(|op| op.id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["deletePet", "getPet", "listPets"]);

    let get_pet = settings
        .operations
        .iter()
        .find(|op| op.id == "getPet")
        .unwrap();
    assert_eq!(get_pet.request.path[0].name, "petId");
    assert_eq!(get_pet.responses[0].contents[0].examples[0].key(), "rex");

    Ok(())
}

#[test]
fn test_defaults_without_config_file() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let settings = Settings::from_root(temp_dir.path().to_str().unwrap())?;

    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 4010);
    assert!(!settings.mock.dynamic);
    assert!(settings.mock.cors);
    assert!(settings.operations.is_empty());
    Ok(())
}

#[test]
fn test_duplicate_operations_fail_validation() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    fs::create_dir_all(root.join("config/operations"))?;

    let operation = r#"[{ "id": "listPets", "method": "get", "path": "/pets", "responses": [{ "code": "200" }] }]"#;
    fs::write(root.join("config/operations/a.json"), operation)?;
    fs::write(root.join("config/operations/b.json"), operation)?;

    let error = Settings::from_root(root.to_str().unwrap()).unwrap_err();
    assert!(error.to_string().contains("Configuration validation failed"));
    Ok(())
}

#[test]
fn test_load_single_operation_yaml() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("single.yml");
    fs::write(
        &path,
        r#"
id: ping
method: get
path: /ping
responses:
  - code: "200"
    contents:
      - mediaType: text/plain
        examples:
          - key: pong
            value: pong
"#,
    )?;

    let operations = load_operations_file(&path)?;
    assert_eq!(operations.len(), 1);
    assert_eq!(operations[0].id, "ping");
    Ok(())
}

#[test]
fn test_invalid_operations_file_is_an_error() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("broken.json");
    fs::write(&path, "{ not json")?;

    let error = load_operations_file(&path).unwrap_err();
    assert!(error.to_string().contains("JSON parse error"));
    Ok(())
}
