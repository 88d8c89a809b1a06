use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn opr(credentials: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("opr").unwrap();
    cmd.env_remove("RUST_LOG")
        .env("OPR_CREDENTIALS", credentials)
        .env("OPR_API_URL", "http://127.0.0.1:1")
        .env("OPR_ASN_URL", "http://127.0.0.1:1/asn")
        .arg("--no-color");
    cmd
}

fn asn_batch() -> serde_json::Value {
    json!([
        {"input": "AS13335", "error": "", "output": {
            "asn": 13335, "name": "CLOUDFLARENET", "handle": "AS13335",
            "ipv4_ranges": ["104.16.0.0/30"], "ipv6_ranges": ["2606:4700::/32"]
        }},
        {"input": "AS0", "error": "reserved AS number", "output": null},
        {"input": "8.8.8.8", "error": "", "output": {
            "asn": 15169, "name": "GOOGLE", "ipv4_ranges": ["8.8.8.0/31"]
        }}
    ])
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    opr(&dir.path().join("credentials.toml"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("results"))
        .stdout(predicate::str::contains("domains"))
        .stdout(predicate::str::contains("asn"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn config_path_honours_override() {
    let dir = TempDir::new().unwrap();
    let creds = dir.path().join("elsewhere.toml");
    opr(&creds)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", creds.display())));
}

#[test]
fn results_without_credentials_fails_before_any_request() {
    let dir = TempDir::new().unwrap();
    opr(&dir.path().join("missing.toml"))
        .args(["results", "example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("credentials unavailable"))
        .stderr(predicate::str::contains("opr config setup"));
}

#[test]
fn results_rejects_unknown_query_keyword() {
    let dir = TempDir::new().unwrap();
    opr(&dir.path().join("credentials.toml"))
        .args(["results", "example.com", "--query", "web,nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn asn_rejects_csv() {
    let dir = TempDir::new().unwrap();
    opr(&dir.path().join("credentials.toml"))
        .args(["asn", "--output", "csv", "AS3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CSV output is not available"));
}

#[tokio::test(flavor = "multi_thread")]
async fn asn_cidr_continues_past_missing_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/asn/AS13335,AS0,8.8.8.8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(asn_batch()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    opr(&dir.path().join("credentials.toml"))
        .env("OPR_ASN_URL", format!("{}/asn", server.uri()))
        .args(["asn", "--cidr", "AS13335,", "AS0", "8.8.8.8"])
        .assert()
        .success()
        .stdout("104.16.0.0/30\n2606:4700::/32\n8.8.8.0/31\n")
        .stderr(predicate::str::contains("no data for input: AS0"));
}

#[tokio::test(flavor = "multi_thread")]
async fn asn_reads_inputs_from_stdin() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/asn/AS13335,AS0,8.8.8.8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(asn_batch()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = opr(&dir.path().join("credentials.toml"))
        .env("OPR_ASN_URL", format!("{}/asn", server.uri()))
        .args(["--output", "json", "asn", "--ip"])
        .write_stdin("AS13335 AS0\n8.8.8.8\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let ips: Vec<String> = serde_json::from_slice(&output).unwrap();
    assert_eq!(ips, ["104.16.0.1", "104.16.0.2", "104.16.0.3", "8.8.8.1"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn domains_csv_is_passed_through() {
    let server = MockServer::start().await;
    let csv = "domain,is_active\nexample.com,true\n";
    Mock::given(method("GET"))
        .and(path("/v1/domains"))
        .and(query_param("format", "csv"))
        .and(header_exists("API-Sign"))
        .and(header_exists("API-Key"))
        .respond_with(ResponseTemplate::new(200).set_body_string(csv))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let creds = dir.path().join("credentials.toml");
    std::fs::write(&creds, "apikey = \"key-123\"\napisecret = \"c2VjcmV0\"\n").unwrap();

    opr(&creds)
        .env("OPR_API_URL", server.uri())
        .args(["domains", "-o", "csv"])
        .assert()
        .success()
        .stdout(csv);
}

#[tokio::test(flavor = "multi_thread")]
async fn api_errors_exit_non_zero() {
    let server = MockServer::start().await;
    Mock::given(path("/v1/results"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "meta": {"error": "invalid signature"}
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let creds = dir.path().join("credentials.toml");
    std::fs::write(&creds, "apikey = \"key-123\"\napisecret = \"c2VjcmV0\"\n").unwrap();

    opr(&creds)
        .env("OPR_API_URL", server.uri())
        .args(["results", "example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API error: invalid signature"));
}
