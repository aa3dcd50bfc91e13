mod common;

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use rust_xlsxwriter::Workbook;
use serde_json::json;

use common::{message, results, TestServer};

/// An xlsx with a header row followed by `rows`, each a list of (column, text).
fn workbook(rows: &[&[(u16, &str)]]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "header")?;
    for (i, cells) in rows.iter().enumerate() {
        for (col, text) in cells.iter() {
            sheet.write_string(i as u32 + 1, *col, *text)?;
        }
    }
    Ok(workbook.save_to_buffer()?)
}

fn file_part(bytes: Vec<u8>, filename: &str) -> Part {
    Part::bytes(bytes).file_name(filename.to_string())
}

#[tokio::test]
async fn student_import_upserts_schools_and_students() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;

    let sheet = workbook(&[
        &[(1, "Ani"), (3, "sma 1 bogor"), (5, "jawa barat"), (11, "female"), (12, "0811")],
        &[(1, "Bayu"), (3, "SMA 1 Bogor"), (11, "male"), (12, "0812")],
        &[],
        &[(1, "Tanpa Sekolah")],
    ])?;

    let form = Form::new().part("file", file_part(sheet.clone(), "students.xlsx"));
    let (status, body) = server.post_multipart("/student/upload-excel", &token, form).await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(message(&body), "Data imported successfully");
    let stats = results(&body);
    assert_eq!(stats["school_stats"]["created_count"], 1);
    assert_eq!(stats["school_stats"]["updated_count"], 1);
    assert_eq!(stats["school_stats"]["failed_count"], 1);
    assert_eq!(stats["school_stats"]["failed_rows"], json!([5]));
    assert_eq!(stats["student_stats"]["created_count"], 2);
    assert_eq!(stats["skipped_rows"], json!([4]));

    let form = Form::new().part("file", file_part(sheet, "students.xlsx"));
    let (_, body) = server.post_multipart("/student/upload-excel", &token, form).await?;
    assert_eq!(results(&body)["student_stats"]["created_count"], 0);
    assert_eq!(results(&body)["student_stats"]["updated_count"], 2);

    let (_, body) = server
        .post("/student/all", Some(&token), json!({"school": "SMA 1 BOGOR"}))
        .await?;
    assert_eq!(results(&body)["TotalRecords"], 2);
    Ok(())
}

#[tokio::test]
async fn program_import_links_into_the_catalog() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;

    let (status, body) = server
        .post(
            "/knowledge-base/create",
            Some(&token),
            json!({"year": "2024", "programs": [{"name": "saintek", "display_name": "SAINTEK"}]}),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let kb_id = results(&body)["id"].as_str().context("no id")?.to_string();

    let sheet = workbook(&[
        &[(2, "Universitas Gadjah Mada"), (3, "UGM"), (13, "Kedokteran"), (14, "S1"), (15, "SNBT"), (24, "2024-03-01")],
        &[(2, "Universitas Gadjah Mada"), (13, "Farmasi"), (14, "S1"), (15, "SNBT")],
    ])?;

    let form = Form::new()
        .part("file", file_part(sheet.clone(), "programs.xlsx"))
        .text("knowledgeBaseYear", "2030")
        .text("knowledgeProgramName", "saintek");
    let (status, _) = server.post_multipart("/study-program/upload", &token, form).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let form = Form::new()
        .part("file", file_part(sheet, "programs.xlsx"))
        .text("knowledgeBaseYear", "2024")
        .text("knowledgeProgramName", "saintek");
    let (status, body) = server.post_multipart("/study-program/upload", &token, form).await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(results(&body)["university_stats"]["created_count"], 1);
    assert_eq!(results(&body)["university_stats"]["updated_count"], 1);
    assert_eq!(results(&body)["program_stats"]["created_count"], 2);

    let (_, body) = server
        .post("/study-program/all", Some(&token), json!({"kbYear": "2024", "kpName": "saintek"}))
        .await?;
    assert_eq!(results(&body)["TotalRecords"], 2);
    assert_eq!(
        results(&body)["Records"][0]["university"]["name"],
        "Universitas Gadjah Mada"
    );

    let (_, body) = server
        .post("/knowledge-programs/get", Some(&token), json!({"id": kb_id}))
        .await?;
    assert_eq!(results(&body)[0]["study_programs"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn unsupported_spreadsheet_is_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;

    let form = Form::new().part("file", file_part(b"name,school\n".to_vec(), "students.csv"));
    let (status, _) = server.post_multipart("/student/upload-excel", &token, form).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let form = Form::new().text("knowledgeBaseYear", "2024");
    let (status, _) = server.post_multipart("/student/upload-excel", &token, form).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn image_upload_is_served_back() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.admin_token().await?;
    let png = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    let form = Form::new().part("image", file_part(png.clone(), "avatar.PNG"));
    let (status, body) = server.post_multipart("/student/upload", &token, form).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message(&body), "Upload Image Success");

    let url = results(&body).as_str().context("url is not a string")?;
    assert!(url.starts_with(&format!("{}/images/", server.base_url)));
    assert!(url.ends_with(".png"));

    let res = server.client.get(url).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.bytes().await?.to_vec(), png);

    let form = Form::new().part("image", file_part(b"%PDF".to_vec(), "cv.pdf"));
    let (status, _) = server.post_multipart("/student/upload", &token, form).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}
