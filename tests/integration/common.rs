use repair_harvest::config::{load_config_with_hash, Config};
use std::path::{Path, PathBuf};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ARTICLE: &str = r#"<html><head><title>Dell laptop battery replacement</title></head><body>
    <p>Warning: disconnect power before replacing the battery on this Dell laptop.</p>
    <p>Step 1: remove the back panel. Step 2: unscrew the battery with a screwdriver.
    Step 3: lift the battery out of the chassis.</p>
    <a href="/support/home">Next article</a>
</body></html>"#;

pub const NOT_FOUND_PAGE: &str = r#"<html><head><title>Support</title></head><body>
    <h2>404 - Page not found</h2>
    <p>We couldn't find this page. Try searching the knowledge base instead.</p>
</body></html>"#;

pub struct Site {
    pub server: MockServer,
}

impl Site {
    /// A small support site:
    ///
    /// - `/support/home` is a short hub page linking to everything else
    /// - `/support/kbdoc/1` is a full article
    /// - `/support/kbdoc/old` redirects to the article
    /// - `/support/kbdoc/gone` is not mounted and answers 404
    /// - `/support/manual.pdf` is a PDF
    /// - `/support/missing` serves not-found boilerplate with status 200
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base = server.uri();

        let home = format!(
            r#"<html><head><title>Support home</title></head><body>
            <p>Find articles</p>
            <a href="/support/kbdoc/1">Battery</a>
            <a href="/support/kbdoc/old">Old link</a>
            <a href="/support/kbdoc/gone">Gone</a>
            <a href="/support/manual.pdf">Manual</a>
            <a href="/images/board.png">Board</a>
            <a href="/support/missing">Missing</a>
            <a href="/login">Sign in</a>
            <a href="https://www.reddit.com/r/techsupport">Forum</a>
            <a href="{base}/support/kbdoc/1?utm_source=home#top">Battery again</a>
            </body></html>"#
        );

        Mock::given(method("GET"))
            .and(path("/support/home"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(home, "text/html"))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/support/kbdoc/1"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(ARTICLE, "text/html"))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/support/kbdoc/old"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("location", format!("{}/support/kbdoc/1", base).as_str()),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/support/manual.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/support/missing"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(NOT_FOUND_PAGE, "text/html"))
            .mount(&server)
            .await;

        Self { server }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.server.uri(), path)
    }

    pub fn host(&self) -> String {
        url::Url::parse(&self.server.uri())
            .unwrap()
            .host_str()
            .unwrap()
            .to_string()
    }
}

pub struct Workspace {
    pub dir: tempfile::TempDir,
    pub config_path: PathBuf,
}

impl Workspace {
    pub fn new(site: &Site) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("harvest.toml");

        let toml = format!(
            r#"
[crawler]
request-delay-ms = 0
checkpoint-interval = 1

[user-agent]
crawler-name = "TestHarvester"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[output]
dataset-path = "{dataset}"
checkpoint-path = "{checkpoint}"

[frontier]
allowed-domains = ["{host}"]
seeds = ["{seed}"]
skip-patterns = ['/login', '\.png$', '#']
priority-patterns = ['/kbdoc/']
"#,
            dataset = dir.path().join("out").join("data.jsonl").display(),
            checkpoint = dir.path().join("out").join("checkpoint.db").display(),
            host = site.host(),
            seed = site.url("/support/home"),
        );
        std::fs::write(&config_path, toml).unwrap();

        Self { dir, config_path }
    }

    pub fn config(&self) -> (Config, String) {
        load_config_with_hash(&self.config_path).unwrap()
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.dir.path().join("out").join("data.jsonl")
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.dir.path().join("out").join("checkpoint.db")
    }

    /// Parsed dataset lines
    pub fn records(&self) -> Vec<serde_json::Value> {
        read_records(&self.dataset_path())
    }
}

pub fn read_records(path: &Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}
