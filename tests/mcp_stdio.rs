use std::path::{Path, PathBuf};

use quickfix::{CollectionKind, DataDir, EntryStore, NewEntry};
use rmcp::{
    ServiceExt,
    model::CallToolRequestParams,
    transport::{ConfigureCommandExt, TokioChildProcess},
};
use serde_json::json;

fn setup_fixture(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = DataDir::resolve(Some(data_dir))?;
    let store = EntryStore::open(&data_dir.entries_db())?;

    store.append(
        CollectionKind::Fixes,
        NewEntry::new(
            "Reset Panel",
            "power down mains and battery, wait 30 seconds, power up",
        )
        .with_tags(["scantronic"]),
    )?;
    store.append(
        CollectionKind::Fixes,
        NewEntry::new("Reset Panel", "enter engineer code and press reset")
            .with_tags(["texecom"]),
    )?;
    store.append(
        CollectionKind::Guides,
        NewEntry::new("Blue wire", "the blue wire is the tamper return"),
    )?;

    Ok(())
}

#[tokio::test]
async fn mcp_stdio_search_roundtrip() -> Result<(), Box<dyn std::error::Error>>
{
    let tempdir = tempfile::tempdir()?;
    setup_fixture(tempdir.path())?;

    let bin = quickfix_bin()?;
    let transport = TokioChildProcess::new(
        tokio::process::Command::new(bin).configure(|cmd| {
            cmd.arg("mcp")
                .env("QUICKFIX_DATA_DIR", tempdir.path())
                .env_remove("QUICKFIX_TAG_BONUS")
                .env_remove("QUICKFIX_LIMIT");
        }),
    )?;

    let client = ().serve(transport).await?;

    let args = json!({
        "query": "texecom panel reset",
        "limit": 5
    });

    let result = client
        .peer()
        .call_tool(CallToolRequestParams::new("quickfix_search")
                .with_arguments(args.as_object().unwrap().clone()),
        )
        .await?;

    let structured = result.structured_content.expect("structured content");
    let results = structured
        .get("results")
        .and_then(|v| v.as_array())
        .expect("results array");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].get("id").and_then(|v| v.as_u64()), Some(2));
    assert_eq!(
        results[0].get("tagBonusApplied").and_then(|v| v.as_bool()),
        Some(true)
    );

    let guide_args = json!({
        "query": "blue wire",
        "collection": "guides"
    });
    let guide_result = client
        .peer()
        .call_tool(CallToolRequestParams::new("quickfix_search")
                .with_arguments(guide_args.as_object().unwrap().clone()),
        )
        .await?;
    let structured = guide_result.structured_content.expect("structured");
    assert_eq!(structured["resultCount"], 1);
    assert_eq!(structured["results"][0]["collection"], "guides");

    client.cancel().await?;
    Ok(())
}

fn quickfix_bin() -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Ok(bin) = std::env::var("CARGO_BIN_EXE_quickfix") {
        return Ok(PathBuf::from(bin));
    }

    let mut path = std::env::current_exe()?;
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("quickfix");

    if cfg!(windows) {
        path.set_extension("exe");
    }

    Ok(path)
}
