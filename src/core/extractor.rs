//! Episode page extraction

use crate::core::media_info::{EpisodeRecord, MediaInfo};
use crate::error::HkError;
use crate::platform::client::{HttpClientConfig, HttpFetcher, PageFetcher, DEFAULT_USER_AGENT};
use crate::platform::{decode_manifest, deobfuscate, parse_jwplayer_data, resolve_episode};
use crate::utils::html::html_search_regex;
use crate::utils::js::parse_js_object;
use crate::utils::url::{embed_url, parse_episode_url};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, info};

/// Referer the embed player expects
pub const DEFAULT_REFERER: &str = "https://www.hkanime.com/";

/// Embed player base URL
pub const DEFAULT_EMBED_BASE: &str = "https://play.hkanime.com/embed/";

/// Extractor configuration
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// User-Agent for page requests and stream playback
    pub user_agent: String,
    /// Referer sent with embed page requests
    pub referer: String,
    /// Base URL the video ID is appended to
    pub embed_base: String,
    /// HTTP timeout
    pub timeout: Duration,
    /// Maximum retries
    pub max_retries: u32,
    /// Proxy URL
    pub proxy_url: Option<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            embed_base: DEFAULT_EMBED_BASE.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            proxy_url: None,
        }
    }
}

impl ExtractorConfig {
    fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout: self.timeout,
            max_retries: self.max_retries,
            user_agent: self.user_agent.clone(),
            proxy_url: self.proxy_url.clone(),
        }
    }
}

/// Series page scraped down to what extraction needs
struct SeriesPage {
    name: String,
    manifest: String,
}

fn series_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"mac_name='(.+?)'").unwrap())
}

fn manifest_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"mac_url=unescape\(base64decode\('(.+?)'\)\);").unwrap())
}

fn payload_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"_juicycodes\("(.+?)"\);"#).unwrap())
}

fn player_options_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" = (.+?);").unwrap())
}

/// HKAnime episode extractor
///
/// ```rust,no_run
/// # async fn run() -> hkget::Result<()> {
/// let info = hkget::Extractor::new()
///     .extract("https://www.hkanime.com/animal/416x1x1")
///     .await?;
/// println!("{} ({} formats)", info.title, info.formats.len());
/// # Ok(())
/// # }
/// ```
pub struct Extractor {
    config: ExtractorConfig,
    fetcher: Option<Arc<dyn PageFetcher>>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    /// Create a new extractor with default configuration
    pub fn new() -> Self {
        Self {
            config: ExtractorConfig::default(),
            fetcher: None,
        }
    }

    /// Create a new extractor with custom configuration
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self {
            config,
            fetcher: None,
        }
    }

    /// Set User-Agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set embed page Referer
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.config.referer = referer.into();
        self
    }

    /// Set embed player base URL
    pub fn with_embed_base(mut self, embed_base: impl Into<String>) -> Self {
        self.config.embed_base = embed_base.into();
        self
    }

    /// Set HTTP timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set proxy URL
    pub fn with_proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.config.proxy_url = Some(proxy_url.into());
        self
    }

    /// Use a custom page fetcher instead of the HTTP client
    pub fn with_fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract the episode the URL points to
    pub async fn extract(&self, url: &str) -> Result<MediaInfo, HkError> {
        self.extract_episode(url, None).await
    }

    /// Extract an episode of the series the URL belongs to
    ///
    /// `episode` overrides the 1-based episode number parsed from the URL.
    pub async fn extract_episode(
        &self,
        url: &str,
        episode: Option<usize>,
    ) -> Result<MediaInfo, HkError> {
        let page_ref = parse_episode_url(url)?;
        let episode = episode.unwrap_or(page_ref.episode);
        info!("Extracting {} episode {}", page_ref.path_id, episode);

        let fetcher = self.fetcher()?;
        let series = self.fetch_series_page(fetcher.as_ref(), url).await?;
        let record = resolve_episode(&series.manifest, episode)?;
        debug!("Episode {} is {:?} ({})", episode, record.title, record.video_id);

        let embed = embed_url(&self.config.embed_base, &record.video_id);
        let embed_page = fetcher
            .fetch(
                &embed,
                &[
                    ("User-Agent", self.config.user_agent.as_str()),
                    ("Referer", self.config.referer.as_str()),
                ],
            )
            .await?;

        let payload =
            html_search_regex(payload_regex(), &embed_page, "juicycodes")?.replace("\"+\"", "");
        let script = deobfuscate(&payload)?;
        debug!("Deobfuscated player script: {} chars", script.chars().count());

        let options = html_search_regex(player_options_regex(), &script, "jwplayer options")?;
        let options = parse_js_object(&options)?;

        let title = format!("{} - {}", series.name, record.title);
        let mut media = parse_jwplayer_data(&options, &record.video_id, &title, Some(embed.as_str()))?;
        media.attach_http_headers(&self.stream_headers());

        info!("Found {} formats for {}", media.formats.len(), media.title);
        Ok(media)
    }

    /// List every episode of the series the URL belongs to
    pub async fn list_episodes(&self, url: &str) -> Result<Vec<EpisodeRecord>, HkError> {
        parse_episode_url(url)?;
        let fetcher = self.fetcher()?;
        let series = self.fetch_series_page(fetcher.as_ref(), url).await?;
        decode_manifest(&series.manifest)
    }

    async fn fetch_series_page(
        &self,
        fetcher: &dyn PageFetcher,
        url: &str,
    ) -> Result<SeriesPage, HkError> {
        let webpage = fetcher
            .fetch(url, &[("User-Agent", self.config.user_agent.as_str())])
            .await?;

        Ok(SeriesPage {
            name: html_search_regex(series_name_regex(), &webpage, "series name")?,
            manifest: html_search_regex(manifest_regex(), &webpage, "series info")?,
        })
    }

    /// Headers every stream request must carry
    fn stream_headers(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("User-Agent".to_string(), self.config.user_agent.clone()),
            ("Range".to_string(), "bytes=0-".to_string()),
        ])
    }

    fn fetcher(&self) -> Result<Arc<dyn PageFetcher>, HkError> {
        match &self.fetcher {
            Some(fetcher) => Ok(fetcher.clone()),
            None => Ok(Arc::new(HttpFetcher::with_config(self.config.http_config())?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::cipher::tests::obfuscate;
    use crate::platform::manifest::tests::encode_manifest;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const PAGE_URL: &str = "https://www.hkanime.com/animal/416x1x2";
    const PLAYER_SCRIPT: &str = concat!(
        r#"var player_options = {sources:[{file:"https://cdn.example/v/720.mp4",label:"720p",type:"mp4"},"#,
        r#"{file:'/hls/master.m3u8',type:'hls',},],image:"/thumbnail/vid2.jpg",};"#,
        r#"jwplayer("player").setup(player_options);"#,
    );

    type Request = (String, Vec<(String, String)>);

    /// Serves canned pages and records every request
    #[derive(Default)]
    struct StaticFetcher {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<Request>>,
    }

    impl StaticFetcher {
        fn with_page(mut self, url: &str, body: String) -> Self {
            self.pages.insert(url.to_string(), body);
            self
        }

        fn requests(&self) -> Vec<Request> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, HkError> {
            self.requests.lock().unwrap().push((
                url.to_string(),
                headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ));
            self.pages
                .get(url)
                .cloned()
                .ok_or(HkError::HttpStatus(404))
        }
    }

    /// Forwards hkanime.com requests to a local mock server
    struct LocalSiteFetcher {
        inner: HttpFetcher,
        site: String,
    }

    #[async_trait]
    impl PageFetcher for LocalSiteFetcher {
        async fn fetch(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, HkError> {
            let url = url.replacen("https://www.hkanime.com", &self.site, 1);
            self.inner.fetch(&url, headers).await
        }
    }

    fn series_page(name: &str, episodes: &[(&str, &str)]) -> String {
        format!(
            "<html><script>var mac_name='{}',mac_from='hk';\n\
             var mac_url=unescape(base64decode('{}'));</script></html>",
            name,
            encode_manifest(episodes)
        )
    }

    fn embed_page(script: &str) -> String {
        let payload = obfuscate(script, "def");
        let (head, tail) = payload.split_at(payload.len() / 2);
        format!(
            "<html><body><div id=\"player\"></div>\
             <script>_juicycodes(\"{}\"+\"{}\");</script></body></html>",
            head, tail
        )
    }

    fn episodes() -> Vec<(&'static str, &'static str)> {
        vec![
            ("EP01 英雄回歸", "vid1"),
            ("EP02 怪人協會", "vid2"),
            ("EP03", "vid3"),
        ]
    }

    fn static_site() -> StaticFetcher {
        StaticFetcher::default()
            .with_page(PAGE_URL, series_page("[粵語] 一拳超人 2", &episodes()))
            .with_page(
                "https://play.hkanime.com/embed/vid2/",
                embed_page(PLAYER_SCRIPT),
            )
    }

    #[tokio::test]
    async fn test_extract_episode_from_url() {
        let fetcher = Arc::new(static_site());
        let extractor = Extractor::new().with_fetcher(fetcher.clone());

        let info = extractor.extract(PAGE_URL).await.unwrap();

        assert_eq!(info.id, "vid2");
        assert_eq!(info.title, "[粵語] 一拳超人 2 - EP02 怪人協會");
        assert_eq!(info.ext, "mp4");
        assert_eq!(info.formats.len(), 2);
        assert_eq!(info.formats[0].url, "https://cdn.example/v/720.mp4");
        assert_eq!(info.formats[0].height, Some(720));
        assert!(info.formats[1].is_hls());
        assert_eq!(info.formats[1].url, "https://play.hkanime.com/hls/master.m3u8");
        assert_eq!(
            info.thumbnail.as_deref(),
            Some("https://play.hkanime.com/thumbnail/vid2.jpg")
        );

        for format in &info.formats {
            assert_eq!(format.http_headers["User-Agent"], DEFAULT_USER_AGENT);
            assert_eq!(format.http_headers["Range"], "bytes=0-");
        }

        let requests = fetcher.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].0, PAGE_URL);
        assert_eq!(
            requests[0].1,
            vec![("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string())]
        );
        assert_eq!(requests[1].0, "https://play.hkanime.com/embed/vid2/");
        assert!(requests[1]
            .1
            .contains(&("Referer".to_string(), DEFAULT_REFERER.to_string())));
    }

    #[tokio::test]
    async fn test_episode_override_and_config() {
        let fetcher = Arc::new(
            static_site().with_page(
                "https://mirror.example/e/vid1/",
                embed_page(PLAYER_SCRIPT),
            ),
        );
        let extractor = Extractor::new()
            .with_fetcher(fetcher.clone())
            .with_embed_base("https://mirror.example/e")
            .with_user_agent("custom-agent")
            .with_referer("https://mirror.example/");

        let info = extractor.extract_episode(PAGE_URL, Some(1)).await.unwrap();

        assert_eq!(info.id, "vid1");
        assert_eq!(info.title, "[粵語] 一拳超人 2 - EP01 英雄回歸");
        assert_eq!(info.formats[0].http_headers["User-Agent"], "custom-agent");
        assert_eq!(info.formats[0].http_headers.len(), 2);

        let requests = fetcher.requests();
        assert!(requests[1]
            .1
            .contains(&("Referer".to_string(), "https://mirror.example/".to_string())));
    }

    #[tokio::test]
    async fn test_episode_out_of_range() {
        let extractor = Extractor::new().with_fetcher(Arc::new(static_site()));

        let result = extractor.extract_episode(PAGE_URL, Some(9)).await;
        assert!(matches!(
            result,
            Err(HkError::EpisodeNotFound {
                episode: 9,
                available: 3
            })
        ));
    }

    #[tokio::test]
    async fn test_missing_payload() {
        let fetcher = static_site().with_page(
            "https://play.hkanime.com/embed/vid2/",
            "<html><video src=\"x.mp4\"></video></html>".to_string(),
        );
        let extractor = Extractor::new().with_fetcher(Arc::new(fetcher));

        match extractor.extract(PAGE_URL).await {
            Err(HkError::NotFound(label)) => assert_eq!(label, "juicycodes"),
            other => panic!("unexpected result: {:?}", other.map(|i| i.id)),
        }
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_unsupported_page() {
        let fetcher = static_site().with_page(
            "https://play.hkanime.com/embed/vid2/",
            "<script>_juicycodes(\"AAAAddd\");</script>".to_string(),
        );
        let extractor = Extractor::new().with_fetcher(Arc::new(fetcher));

        let error = extractor.extract(PAGE_URL).await.unwrap_err();
        assert!(matches!(error, HkError::Alphabet { byte: 0, position: 0 }));
        assert!(error.is_unsupported_page());
    }

    #[tokio::test]
    async fn test_rejects_foreign_url() {
        let fetcher = Arc::new(static_site());
        let extractor = Extractor::new().with_fetcher(fetcher.clone());

        let result = extractor.extract("https://example.com/animal/1x1x1").await;
        assert!(matches!(result, Err(HkError::InvalidUrl(_))));
        assert!(fetcher.requests().is_empty());
    }

    #[test]
    fn test_list_episodes() {
        let extractor = Extractor::new().with_fetcher(Arc::new(static_site()));

        let listed = tokio_test::block_on(extractor.list_episodes(PAGE_URL)).unwrap();
        assert_eq!(
            listed,
            vec![
                EpisodeRecord::new("EP01 英雄回歸", "vid1"),
                EpisodeRecord::new("EP02 怪人協會", "vid2"),
                EpisodeRecord::new("EP03", "vid3"),
            ]
        );
    }

    #[test]
    fn test_default_config() {
        let extractor = Extractor::new()
            .with_timeout(Duration::from_secs(5))
            .with_max_retries(1)
            .with_proxy("http://127.0.0.1:8080");
        let config = extractor.config();
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.referer, DEFAULT_REFERER);
        assert_eq!(config.embed_base, DEFAULT_EMBED_BASE);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.proxy_url.as_deref(), Some("http://127.0.0.1:8080"));
    }

    #[tokio::test]
    async fn test_extract_over_http() {
        let mut server = mockito::Server::new_async().await;
        let series = server
            .mock("GET", "/animal/416x1x3")
            .match_header("user-agent", DEFAULT_USER_AGENT)
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(series_page("Show", &episodes()))
            .create_async()
            .await;
        let embed = server
            .mock("GET", "/embed/vid3/")
            .match_header("referer", DEFAULT_REFERER)
            .with_status(200)
            .with_body(embed_page(
                r#"var o = {file:"https://cdn.example/ep3.mp4",image:"//cdn.example/ep3.jpg"};"#,
            ))
            .create_async()
            .await;

        let fetcher = LocalSiteFetcher {
            inner: HttpFetcher::with_config(HttpClientConfig {
                max_retries: 0,
                ..HttpClientConfig::default()
            })
            .unwrap(),
            site: server.url(),
        };
        let extractor = Extractor::new()
            .with_fetcher(Arc::new(fetcher))
            .with_embed_base(format!("{}/embed/", server.url()));

        let info = extractor
            .extract("https://www.hkanime.com/animal/416x1x3")
            .await
            .unwrap();

        assert_eq!(info.id, "vid3");
        assert_eq!(info.title, "Show - EP03");
        assert_eq!(info.formats.len(), 1);
        assert_eq!(info.formats[0].url, "https://cdn.example/ep3.mp4");
        assert_eq!(info.thumbnail.as_deref(), Some("https://cdn.example/ep3.jpg"));
        series.assert_async().await;
        embed.assert_async().await;
    }
}
