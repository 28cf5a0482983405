mod common;

use common::{
    Route,
    StubServer,
};
use pretty_assertions::assert_eq;
use repo_traffic_collector::{
    report::{
        summary_rows,
        Totals,
    },
    store,
    ClonesTraffic,
    DailyCount,
    PopularPath,
    Referrer,
    TrafficClient,
    ViewsTraffic,
};
use repo_traffic_config::{
    RepoRef,
    Token,
};
use temp_dir::TempDir;
use url::Url;

const VIEWS: &str = r#"{"count":14850,"uniques":3782,"views":[{"timestamp":"2016-10-10T00:00:00Z","count":440,"uniques":143},{"timestamp":"2016-10-11T00:00:00Z","count":1308,"uniques":414}]}"#;
const CLONES: &str = r#"{"count":173,"uniques":128,"clones":[{"timestamp":"2016-10-10T00:00:00Z","count":2,"uniques":1},{"timestamp":"2016-10-11T00:00:00Z","count":17,"uniques":16}]}"#;
const REFERRERS: &str = r#"[{"referrer":"Google","count":4,"uniques":3},{"referrer":"stackoverflow.com","count":2,"uniques":2}]"#;
const PATHS: &str = r#"[{"path":"/github/hubot","title":"hubot","count":3542,"uniques":2225}]"#;
const REPO: &str = r#"{"id":1296269,"full_name":"octocat/Hello-World","stargazers_count":80}"#;

fn repo() -> RepoRef {
    RepoRef::new("octocat", "Hello-World")
}

fn client(url: &Url) -> TrafficClient {
    TrafficClient::new(url, &Token::new("ghp_test").unwrap()).unwrap()
}

#[test]
fn successful_payloads_are_kept_and_failures_are_null() {
    let server = StubServer::start(vec![
        Route::new("/repos/octocat/Hello-World/traffic/views", 200, VIEWS),
        Route::new("/repos/octocat/Hello-World/traffic/clones", 404, r#"{"message":"Not Found"}"#),
        Route::new("/repos/octocat/Hello-World/traffic/popular/referrers", 200, REFERRERS),
        Route::new("/repos/octocat/Hello-World/traffic/popular/paths", 404, r#"{"message":"Not Found"}"#),
        Route::new("/repos/octocat/Hello-World", 200, REPO),
    ]);

    let snapshot = client(&server.url).get_repo_traffic(&repo());

    assert_eq!(snapshot.repository, "octocat/Hello-World");
    assert_eq!(snapshot.views, Some(serde_json::from_str::<ViewsTraffic>(VIEWS).unwrap()));
    assert_eq!(
        snapshot.referrers,
        Some(serde_json::from_str::<Vec<Referrer>>(REFERRERS).unwrap())
    );
    assert_eq!(snapshot.clones, None);
    assert_eq!(snapshot.paths, None);
    assert_eq!(snapshot.stars, Some(80));

    let written = serde_json::to_value(&snapshot).unwrap();
    assert!(written["clones"].is_null());
    assert!(written["paths"].is_null());
    assert_eq!(written["views"], serde_json::from_str::<serde_json::Value>(VIEWS).unwrap());
    assert_eq!(
        written["referrers"],
        serde_json::from_str::<serde_json::Value>(REFERRERS).unwrap()
    );
}

#[test]
fn clones_and_paths_are_decoded() {
    let server = StubServer::start(vec![
        Route::new("/repos/octocat/Hello-World/traffic/clones", 200, CLONES),
        Route::new("/repos/octocat/Hello-World/traffic/popular/paths", 200, PATHS),
    ]);
    let client = client(&server.url);

    let clones = client.get_clones(&repo()).unwrap();
    assert_eq!(clones.count, 173);
    assert_eq!(clones.uniques, 128);
    assert_eq!(clones.clones[1], DailyCount {
        timestamp: "2016-10-11T00:00:00Z".to_string(),
        count: 17,
        uniques: 16,
    });
    assert_eq!(clones, serde_json::from_str::<ClonesTraffic>(CLONES).unwrap());

    let paths = client.get_popular_paths(&repo()).unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].path, "/github/hubot");
    assert_eq!(paths[0].count, 3542);
}

#[test]
fn requests_carry_auth_and_accept_headers() {
    let server = StubServer::start(vec![Route::new("/repos/octocat/Hello-World/traffic/views", 200, VIEWS)]);

    client(&server.url).get_views(&repo());

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.path, "/repos/octocat/Hello-World/traffic/views");
    assert_eq!(request.header("authorization"), Some("token ghp_test"));
    assert_eq!(request.header("accept"), Some("application/vnd.github.v3+json"));
    assert!(request.header("user-agent").is_some());
}

#[test]
fn one_request_per_facet_in_order() {
    let server = StubServer::start(Vec::new());

    let snapshot = client(&server.url).get_repo_traffic(&repo());

    let paths: Vec<_> = server.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, [
        "/repos/octocat/Hello-World/traffic/views",
        "/repos/octocat/Hello-World/traffic/clones",
        "/repos/octocat/Hello-World",
        "/repos/octocat/Hello-World/traffic/popular/referrers",
        "/repos/octocat/Hello-World/traffic/popular/paths",
    ]);
    assert_eq!(snapshot.views, None);
    assert_eq!(snapshot.stars, None);
}

#[test]
fn undecodable_body_is_absorbed() {
    let server = StubServer::start(vec![
        Route::new("/repos/octocat/Hello-World/traffic/popular/paths", 200, "<html>oops</html>"),
        Route::new("/repos/octocat/Hello-World/traffic/views", 500, "server error"),
    ]);

    let client = client(&server.url);
    assert_eq!(client.get_popular_paths(&repo()), None::<Vec<PopularPath>>);
    assert_eq!(client.get_views(&repo()), None);
}

#[test]
fn unreachable_server_yields_empty_snapshot() {
    // Bind and drop to get a port nobody is listening on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let url = Url::parse(&format!("http://127.0.0.1:{port}")).unwrap();

    let snapshot = client(&url).get_repo_traffic(&repo());

    assert_eq!(snapshot.views, None);
    assert_eq!(snapshot.clones, None);
    assert_eq!(snapshot.stars, None);
    assert_eq!(snapshot.referrers, None);
    assert_eq!(snapshot.paths, None);
}

#[test]
fn collected_snapshot_flows_into_aggregate_totals() {
    let server = StubServer::start(vec![
        Route::new("/repos/octocat/Hello-World/traffic/views", 200, VIEWS),
        Route::new("/repos/octocat/Hello-World", 200, REPO),
        Route::new("/repos/octocat/Spoon-Knife/traffic/views", 200, r#"{"count":10,"uniques":5,"views":[]}"#),
        Route::new("/repos/octocat/Spoon-Knife", 200, r#"{"stargazers_count":12}"#),
    ]);
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("daily.json");
    let client = client(&server.url);

    for repo in [repo(), RepoRef::new("octocat", "Spoon-Knife")] {
        store::record_snapshot(&path, client.get_repo_traffic(&repo)).unwrap();
    }

    let file = store::load_aggregate(&path).unwrap();
    let totals = Totals::from_rows(&summary_rows(&file.data));
    assert_eq!(totals.repositories, 2);
    assert_eq!(totals.views, 14850 + 10);
    assert_eq!(totals.unique_visitors, 3782 + 5);
    assert_eq!(totals.stars, 80 + 12);
}
