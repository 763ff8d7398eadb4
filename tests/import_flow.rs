//! End-to-end import tests against a stub HTTP server.
//!
//! The stub serves canned metadata-feed and source responses on a loopback
//! socket; the aggregator runs the real pipeline against it and the tests
//! assert on the written files and the failure ledger.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use itemforge::aggregator::Aggregator;
use itemforge::config::{self, Settings};
use itemforge::progress::ProgressMode;

// ─── Stub server ────────────────────────────────────────────────────

type Routes = HashMap<String, (u16, String)>;

async fn serve(routes: Routes) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            let routes = Arc::clone(&routes);
            tokio::spawn(handle(socket, routes));
        }
    });

    format!("http://{}", addr)
}

async fn handle(mut socket: tokio::net::TcpStream, routes: Arc<Routes>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let request = String::from_utf8_lossy(&buf);
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    let (status, body) = routes
        .get(&path)
        .cloned()
        .unwrap_or((404, "not found".to_string()));

    let response = format!(
        "HTTP/1.1 {} OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

// ─── Fixtures ───────────────────────────────────────────────────────

fn champion_json(champs: &[(&str, &str, &str)]) -> String {
    let entries: Vec<String> = champs
        .iter()
        .map(|(id, key, name)| {
            format!(r#""{id}": {{"id": "{id}", "key": "{key}", "name": "{name}"}}"#)
        })
        .collect();
    format!(r#"{{"data": {{{}}}}}"#, entries.join(", "))
}

fn item_json() -> String {
    r#"{"data": {
        "1056": {"name": "Doran's Ring"},
        "2003": {"name": "Health Potion"},
        "3285": {"name": "Luden's Echo"},
        "3020": {"name": "Sorcerer's Shoes"},
        "3089": {"name": "Rabadon's Deathcap"},
        "2010": {"name": "Total Biscuit of Rejuvenation", "specialRecipe": 2003}
    }}"#
    .to_string()
}

fn positions_page(positions: &str) -> String {
    format!(r#"<div class="bannerSubtitle">{}</div>"#, positions)
}

fn items_page() -> String {
    r#"
        <div class="itemStarters"><table><tr>
          <td><img alt="Doran's Ring"><img alt="Health Potion"> x2</td>
        </tr></table></div>
        <table class="data_table"><tr><td>popularity</td></tr></table>
        <table class="data_table"><tr><td><img alt="Luden's Echo"><img alt="Sorcerer's Shoes"></td></tr></table>
        <table class="data_table"><tr><td><img alt="Rabadon's Deathcap"></td></tr></table>
        <table class="data_table"><tr><td><img alt="Sorcerer's Shoes"></td></tr></table>
    "#
    .to_string()
}

fn skills_page() -> String {
    r#"
        <table class="skillsOrderTable">
          <tr><td>1</td><td>2</td><td>3</td></tr>
          <tr><td class="skillCell active">.</td><td class="skillCell">.</td><td class="skillCell active">.</td></tr>
          <tr><td class="skillCell">.</td><td class="skillCell active">.</td><td class="skillCell">.</td></tr>
          <tr><td class="skillCell">.</td><td class="skillCell">.</td><td class="skillCell">.</td></tr>
          <tr><td class="skillCell">.</td><td class="skillCell">.</td><td class="skillCell">.</td></tr>
        </table>
    "#
    .to_string()
}

fn metadata_routes(routes: &mut Routes, champs: &[(&str, &str, &str)]) {
    routes.insert(
        "/realms/na.json".to_string(),
        (200, r#"{"v": "6.6.1"}"#.to_string()),
    );
    routes.insert(
        "/cdn/6.6.1/data/en_US/champion.json".to_string(),
        (200, champion_json(champs)),
    );
    routes.insert(
        "/cdn/6.6.1/data/en_US/item.json".to_string(),
        (200, item_json()),
    );
    routes.insert(
        "/contact".to_string(),
        (200, r#"<div class="patch">Patch: 6.6</div>"#.to_string()),
    );
}

fn test_settings(base: &str, itemset_path: &Path) -> Settings {
    let toml = format!(
        r#"
[install]
itemset_path = "{}"

[options]
sr_source = ["leagueofgraphs"]

[endpoints]
data_dragon = "{base}"
leagueofgraphs = "{base}"
ugg = "{base}"
"#,
        itemset_path.display()
    );
    toml::from_str(&toml).unwrap()
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn import_writes_one_build_for_stubbed_champion() {
    let mut routes = Routes::new();
    metadata_routes(&mut routes, &[("Ahri", "103", "Ahri")]);
    routes.insert(
        "/champions/items/ahri/".to_string(),
        (200, positions_page("Mid")),
    );
    routes.insert("/champions/items/ahri/middle/".to_string(), (200, items_page()));
    routes.insert(
        "/champions/skills-orders/ahri/middle/".to_string(),
        (200, skills_page()),
    );

    let base = serve(routes).await;
    let tmp = tempfile::tempdir().unwrap();
    let itemset_path = tmp.path().join("itemsets");
    let settings = test_settings(&base, &itemset_path);
    let settings_path = tmp.path().join("itemforge.toml");

    let aggregator = Aggregator::new(settings, settings_path.clone(), ProgressMode::Off);
    assert!(aggregator.verify_settings());

    let report = aggregator.run(false).await.unwrap();

    assert_eq!(report.version, "6.6");
    assert_eq!(report.written, 1);
    assert!(report.failures.is_empty(), "failures: {:?}", report.failures);

    let expected = itemset_path
        .join("ahri")
        .join("Recommended")
        .join("ITF_ahri_leagueofgraphs_middle.json");
    let content = std::fs::read_to_string(&expected).unwrap();
    assert!(content.contains("\"champion\": \"ahri\""));
    assert!(content.contains("LOG Middle 6.6"));
    // Starter potions kept their occurrence count, and no unorderable
    // special-item id survived the fix-up.
    assert!(content.contains("\"2003\""));
    assert!(!content.contains("\"2010\""));

    // Settings got restamped with the spliced version.
    let reloaded = config::load_settings(&settings_path).unwrap();
    assert_eq!(reloaded.install.local_version.as_deref(), Some("6.6"));
}

#[tokio::test]
async fn one_failing_unit_leaves_siblings_intact() {
    let mut routes = Routes::new();
    metadata_routes(
        &mut routes,
        &[("Ahri", "103", "Ahri"), ("Annie", "1", "Annie")],
    );
    // Ahri fully served.
    routes.insert(
        "/champions/items/ahri/".to_string(),
        (200, positions_page("Mid")),
    );
    routes.insert("/champions/items/ahri/middle/".to_string(), (200, items_page()));
    routes.insert(
        "/champions/skills-orders/ahri/middle/".to_string(),
        (200, skills_page()),
    );
    // Annie's positions resolve, but her build pages 404.
    routes.insert(
        "/champions/items/annie/".to_string(),
        (200, positions_page("Mid")),
    );

    let base = serve(routes).await;
    let tmp = tempfile::tempdir().unwrap();
    let itemset_path = tmp.path().join("itemsets");
    let settings = test_settings(&base, &itemset_path);

    let aggregator = Aggregator::new(
        settings,
        tmp.path().join("itemforge.toml"),
        ProgressMode::Off,
    );
    let report = aggregator.run(false).await.unwrap();

    // Ahri's build still landed.
    assert_eq!(report.written, 1);
    assert!(itemset_path
        .join("ahri")
        .join("Recommended")
        .join("ITF_ahri_leagueofgraphs_middle.json")
        .exists());

    // Exactly one failure, for Annie's one position.
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.champion, "annie");
    assert_eq!(failure.position, "middle");
    assert_eq!(failure.source, "LeagueOfGraphs");
}

#[tokio::test]
async fn unreachable_metadata_feed_fails_the_run() {
    // Nothing served: the version endpoint 404s and the run never reaches
    // fan-out.
    let base = serve(Routes::new()).await;
    let tmp = tempfile::tempdir().unwrap();
    let settings = test_settings(&base, &tmp.path().join("itemsets"));

    let aggregator = Aggregator::new(
        settings,
        tmp.path().join("itemforge.toml"),
        ProgressMode::Off,
    );
    let result = aggregator.run(false).await;

    assert!(matches!(
        result,
        Err(itemforge::errors::Error::Request { .. })
    ));
    assert!(!tmp.path().join("itemsets").exists());
}
