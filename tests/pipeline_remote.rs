use source_atlas::classify::ContentCategory;
use source_atlas::config::{Config, RemoteConfig};
use source_atlas::contract::{MockRepositoryHost, RemoteEntry, RepoMetadata, RepoRef};
use source_atlas::download::GitHubClient;
use source_atlas::pipeline::{remote_artifact_name, FileError, Pipeline};
use source_atlas::serialize::to_json;

fn entry(path: &str, size: u64) -> RemoteEntry {
    RemoteEntry {
        path: path.to_string(),
        sha: format!("sha-{path}"),
        size: Some(size),
    }
}

fn metadata() -> RepoMetadata {
    RepoMetadata {
        name: "demo".to_string(),
        description: Some("A demo app".to_string()),
        demo_link: Some("https://demo.example.com".to_string()),
    }
}

#[tokio::test]
async fn test_remote_repository_is_analyzed_in_listing_order() {
    let mut host = MockRepositoryHost::new();
    host.expect_metadata().times(1).returning(|_| Ok(metadata()));
    host.expect_list_files().times(1).returning(|_| {
        Ok(vec![
            entry("src/App.jsx", 40),
            entry("public/logo.svg", 900),
            entry("node_modules/react/index.js", 10),
            entry("package.json", 20),
        ])
    });
    // Media and ignored files are never fetched.
    host.expect_fetch_content()
        .times(2)
        .returning(|_, entry| match entry.path.as_str() {
            "src/App.jsx" => Ok(b"export default () => <p>hi</p>;".to_vec()),
            "package.json" => Ok(br#"{"name":"demo","private":true}"#.to_vec()),
            other => Err(format!("unexpected fetch of {other}").into()),
        });

    let repo = RepoRef::new("octo", "demo");
    let aggregate = Pipeline::new(&Config::default(), None)
        .analyze_remote(&host, &repo)
        .await;

    assert_eq!(aggregate.metadata, Some(metadata()));
    let paths: Vec<_> = aggregate.files.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["src/App.jsx", "public/logo.svg", "package.json"]);

    let logo = aggregate.record("public/logo.svg").unwrap();
    assert_eq!(logo.category, ContentCategory::Media);
    assert_eq!(logo.source_size, 900);

    let json = to_json(&aggregate.to_graph());
    assert_eq!(json["metadata"]["name"], "demo");
    assert_eq!(json["metadata"]["demoLink"], "https://demo.example.com");
    assert_eq!(json["files"][0]["ast"]["type"], "File");
    assert_eq!(json["files"][2]["ast"]["private"]["kind"], "boolean");
}

#[tokio::test]
async fn test_metadata_failure_yields_null_metadata() {
    let mut host = MockRepositoryHost::new();
    host.expect_metadata()
        .returning(|_| Err("404 Not Found".into()));
    host.expect_list_files()
        .returning(|_| Ok(vec![entry("index.css", 5)]));
    host.expect_fetch_content()
        .returning(|_, _| Ok(b"a{}".to_vec()));

    let aggregate = Pipeline::new(&Config::default(), None)
        .analyze_remote(&host, &RepoRef::new("octo", "demo"))
        .await;

    assert!(aggregate.metadata.is_none());
    assert_eq!(aggregate.files.len(), 1);
    assert!(to_json(&aggregate.to_graph())["metadata"].is_null());
}

#[tokio::test]
async fn test_listing_failure_yields_empty_file_set() {
    let mut host = MockRepositoryHost::new();
    host.expect_metadata().returning(|_| Ok(metadata()));
    host.expect_list_files()
        .returning(|_| Err("rate limited".into()));
    host.expect_fetch_content().times(0);

    let aggregate = Pipeline::new(&Config::default(), None)
        .analyze_remote(&host, &RepoRef::new("octo", "demo"))
        .await;

    assert!(aggregate.metadata.is_some());
    assert!(aggregate.files.is_empty());
}

#[tokio::test]
async fn test_fetch_failure_is_isolated_to_its_record() {
    let mut host = MockRepositoryHost::new();
    host.expect_metadata().returning(|_| Ok(metadata()));
    host.expect_list_files()
        .returning(|_| Ok(vec![entry("a.js", 1), entry("b.js", 1)]));
    host.expect_fetch_content()
        .returning(|_, entry| {
            if entry.path == "a.js" {
                Err("connection reset".into())
            } else {
                Ok(b"const b = 1;".to_vec())
            }
        });

    let aggregate = Pipeline::new(&Config::default(), None)
        .analyze_remote(&host, &RepoRef::new("octo", "demo"))
        .await;

    let a = aggregate.record("a.js").unwrap();
    assert!(matches!(a.error(), Some(FileError::Fetch(msg)) if msg.contains("connection reset")));
    assert!(aggregate.record("b.js").unwrap().representation().is_some());
}

#[test]
fn test_remote_artifact_name() {
    assert_eq!(remote_artifact_name(&RepoRef::new("octo", "demo")), "demo.json");
    assert_eq!(remote_artifact_name(&RepoRef::new("octo", "we:ird")), "we_ird.json");
}

#[test]
fn test_tree_listing_uses_head_in_one_request() {
    let config = RemoteConfig {
        api_base: "https://github.example.com/api/v3/".to_string(),
        timeout_secs: 5,
        token: None,
    };
    let client = GitHubClient::from_config(&config).unwrap();
    assert_eq!(
        client.tree_url(&RepoRef::new("octo", "demo")),
        "https://github.example.com/api/v3/repos/octo/demo/git/trees/HEAD?recursive=1"
    );
}
