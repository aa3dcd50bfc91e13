mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{message, results, TestServer};

fn id_of(body: &Value) -> Result<String> {
    results(body)["id"]
        .as_str()
        .map(str::to_string)
        .context("result has no id")
}

/// A 2024 knowledge base with one empty `saintek` program.
async fn seed_catalog(server: &TestServer, token: &str) -> Result<String> {
    let (status, body) = server
        .post(
            "/knowledge-base/create",
            Some(token),
            json!({"year": "2024", "programs": [{"name": "saintek", "display_name": "SAINTEK", "study_programs": []}]}),
        )
        .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "knowledge base create failed: {}", body);
    id_of(&body)
}

#[tokio::test]
async fn knowledge_base_and_programs() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;
    let kb_id = seed_catalog(&server, &token).await?;

    let (status, _) = server
        .post("/knowledge-base/create", Some(&token), json!({"year": "2024"}))
        .await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, body) = server
        .post(
            "/knowledge-programs/add",
            Some(&token),
            json!({"id": kb_id, "KnowledgeProgram": {"name": "soshum", "display_name": "SOSHUM"}}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(message(&body), "Knowledge Program added successfully");

    let (status, _) = server
        .post(
            "/knowledge-programs/add",
            Some(&token),
            json!({"id": kb_id, "KnowledgeProgram": {"name": "soshum"}}),
        )
        .await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, body) = server
        .post(
            "/knowledge-programs/update",
            Some(&token),
            json!({"id": kb_id, "oldName": "soshum", "KnowledgeProgram": {"name": "campuran", "display_name": "CAMPURAN"}}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(message(&body), "Knowledge Program update successfully");

    let (status, body) = server
        .post("/knowledge-programs/get", Some(&token), json!({"id": kb_id}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = results(&body)
        .as_array()
        .context("programs is not a list")?
        .iter()
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert_eq!(names, vec!["saintek", "campuran"]);

    let (status, body) = server
        .post("/knowledge-programs/delete", Some(&token), json!({"id": kb_id, "program_name": "campuran"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(message(&body), "Knowledge Program removed successfully");

    let (status, body) = server
        .post(
            "/knowledge-base/update",
            Some(&token),
            json!({"id": kb_id, "knowledgeBase": {"year": "2025"}}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results(&body)["year"], "2025");
    assert_eq!(results(&body)["programs"].as_array().map(Vec::len), Some(1));

    let (_, body) = server.post("/knowledge-base/all", Some(&token), json!({})).await?;
    assert_eq!(message(&body), "Knowledge Base fetched successfully");
    assert_eq!(results(&body).as_array().map(Vec::len), Some(1));

    let (status, body) = server.post("/knowledge-base/delete", Some(&token), json!({"id": kb_id})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(message(&body), "KnowledgeBase deleted successfully");

    let (status, _) = server
        .post("/knowledge-programs/get", Some(&token), json!({"id": kb_id}))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn universities() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;

    let (status, body) = server
        .post(
            "/university/create",
            Some(&token),
            json!({"name": "Universitas Indonesia", "alias": "UI", "contact": {"email": "humas@ui.ac.id", "phone": "021", "fax": ""}}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(message(&body), "University created successfully");
    let id = id_of(&body)?;

    let (status, _) = server
        .post("/university/create", Some(&token), json!({"name": "Universitas Indonesia"}))
        .await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, body) = server
        .post("/university/update", Some(&token), json!({"id": id, "university": {"website": "https://ui.ac.id"}}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results(&body)["alias"], "UI");
    assert_eq!(results(&body)["website"], "https://ui.ac.id");

    let (_, body) = server
        .post("/university/name", Some(&token), json!({"name": "Universitas Indonesia"}))
        .await?;
    assert_eq!(results(&body)["id"], id.as_str());
    assert_eq!(results(&body)["contact"]["email"], "humas@ui.ac.id");

    let (_, body) = server.post("/university/all", Some(&token), json!({})).await?;
    assert_eq!(message(&body), "Universities fetched successfully");
    assert_eq!(results(&body).as_array().map(Vec::len), Some(1));

    let (status, _) = server.post("/university/delete", Some(&token), json!({"id": id})).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = server.post("/university/id", Some(&token), json!({"id": id})).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn study_programs_live_inside_a_catalog_program() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;
    let kb_id = seed_catalog(&server, &token).await?;

    let (_, body) = server
        .post("/university/create", Some(&token), json!({"name": "Institut Teknologi Bandung"}))
        .await?;
    let university_id = id_of(&body)?;

    let (status, _) = server
        .post(
            "/study-program/create",
            Some(&token),
            json!({"kbYear": "2024", "kpName": "missing", "study_program": {"name": "Informatika"}}),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = server
        .post(
            "/study-program/create",
            Some(&token),
            json!({
                "kbYear": "2024",
                "kpName": "saintek",
                "study_program": {
                    "name": "Teknik Informatika",
                    "program_details": {
                        "university": university_id,
                        "program": "S1",
                        "program_type": "SNBT",
                        "registration": {"start": "2024-03-01T00:00:00Z", "end": "2024-03-20T00:00:00Z"}
                    }
                }
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(message(&body), "Study Program created successfully");
    let program_id = id_of(&body)?;

    let (_, body) = server
        .post(
            "/study-program/create",
            Some(&token),
            json!({"kbYear": "2024", "kpName": "saintek", "study_program": {"name": "Matematika", "program_details": {"program": "S1", "program_type": "SNBP"}}}),
        )
        .await?;
    let orphan_id = id_of(&body)?;

    let (status, body) = server
        .post("/study-program/id", Some(&token), json!({"id": program_id}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results(&body)["study_program"]["name"], "Teknik Informatika");
    assert_eq!(results(&body)["university"]["name"], "Institut Teknologi Bandung");

    let (_, body) = server
        .post("/study-program/id", Some(&token), json!({"id": orphan_id}))
        .await?;
    assert!(results(&body)["university"].is_null());

    let (status, body) = server
        .post(
            "/study-program/all",
            Some(&token),
            json!({"kbYear": "2024", "kpName": "saintek", "programType": "SNBT"}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(message(&body), "Fetched study programs successfully");
    assert_eq!(results(&body)["TotalRecords"], 1);
    assert_eq!(results(&body)["Records"][0]["study_program"]["id"], program_id.as_str());

    let (status, _) = server.post("/study-program/all", Some(&token), json!({"kbYear": "2024"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server
        .post(
            "/study-program/update",
            Some(&token),
            json!({"id": orphan_id, "study_program": {"name": "Matematika Murni"}}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results(&body)["name"], "Matematika Murni");

    let (status, body) = server
        .post("/study-program/delete", Some(&token), json!({"id": program_id}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results(&body)["id"], program_id.as_str());

    let (_, body) = server
        .post("/knowledge-programs/get", Some(&token), json!({"id": kb_id}))
        .await?;
    let linked = &results(&body)[0]["study_programs"];
    assert_eq!(linked.as_array().map(Vec::len), Some(1));
    assert_eq!(linked[0], orphan_id.as_str());
    Ok(())
}
