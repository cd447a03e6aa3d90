use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::error;

use crate::config::Config;
use crate::AppState;

const CACHE_TTL: Duration = Duration::from_secs(300);

/// `GET /api/github` — the user's public repositories, reshaped for the
/// dashboard. Upstream responses are cached in-process for five minutes.
pub async fn list_repos(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if let Some(projects) = state.repo_cache.fresh().await {
        return Ok(Json(json!({ "projects": projects })));
    }

    match fetch_repos(&state.http, &state.config).await {
        Ok(projects) => {
            state.repo_cache.store(projects.clone()).await;
            Ok(Json(json!({ "projects": projects })))
        }
        Err(err) => {
            error!("GitHub fetch error: {}", err);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch repos", "projects": [] })),
            ))
        }
    }
}

async fn fetch_repos(
    http: &reqwest::Client,
    config: &Config,
) -> Result<Vec<Project>, reqwest::Error> {
    let repos: Vec<GitHubRepo> = http
        .get(format!(
            "{}/users/{}/repos",
            config.github_api_url, config.github_user
        ))
        .query(&[("sort", "pushed"), ("per_page", "50")])
        .header(reqwest::header::ACCEPT, "application/vnd.github.v3+json")
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(to_projects(repos))
}

fn to_projects(repos: Vec<GitHubRepo>) -> Vec<Project> {
    repos
        .into_iter()
        .filter(|repo| !repo.private)
        .map(|repo| Project {
            name: format_name(&repo.name),
            id: repo.name,
            description: repo
                .description
                .unwrap_or_else(|| "No description".to_string()),
            repo_url: repo.html_url,
            live_url: repo.homepage,
            pushed_at: repo.pushed_at,
            language: repo.language,
            topics: repo.topics,
            stars: repo.stargazers_count,
        })
        .collect()
}

/// Converts a kebab-case repo name to Title Case.
fn format_name(name: &str) -> String {
    name.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The subset of the GitHub repository object the dashboard cares about.
#[derive(Debug, Deserialize)]
struct GitHubRepo {
    name: String,
    description: Option<String>,
    html_url: String,
    homepage: Option<String>,
    pushed_at: Option<String>,
    private: bool,
    #[serde(default)]
    topics: Vec<String>,
    language: Option<String>,
    stargazers_count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    id: String,
    name: String,
    description: String,
    repo_url: String,
    live_url: Option<String>,
    pushed_at: Option<String>,
    language: Option<String>,
    topics: Vec<String>,
    stars: u64,
}

#[derive(Default)]
pub struct RepoCache {
    inner: RwLock<Option<CachedProjects>>,
}

struct CachedProjects {
    fetched_at: Instant,
    projects: Vec<Project>,
}

impl RepoCache {
    async fn fresh(&self) -> Option<Vec<Project>> {
        let inner = self.inner.read().await;
        inner
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < CACHE_TTL)
            .map(|cached| cached.projects.clone())
    }

    async fn store(&self, projects: Vec<Project>) {
        *self.inner.write().await = Some(CachedProjects {
            fetched_at: Instant::now(),
            projects,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use crate::{app, AppState};

    async fn spawn_stub(router: Router) -> SocketAddr {
        let server =
            axum::Server::bind(&"127.0.0.1:0".parse().unwrap()).serve(router.into_make_service());
        let addr = server.local_addr();
        tokio::spawn(server);
        addr
    }

    fn config_for(github_api_url: String) -> Config {
        Config {
            location_token: "t".to_string(),
            nominatim_url: "http://127.0.0.1:1".to_string(),
            github_api_url,
            github_user: "nobody".to_string(),
            gateway_url: "http://127.0.0.1:1".to_string(),
            gateway_token: String::new(),
        }
    }

    async fn get_github(app: &Router) -> (axum::http::StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/github")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn upstream_is_hit_once_within_the_cache_window() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let stub = Router::new().route(
            "/users/nobody/repos",
            get(move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!([{
                        "name": "hq-dashboard",
                        "description": "command center",
                        "html_url": "https://github.com/nobody/hq-dashboard",
                        "homepage": null,
                        "pushed_at": "2026-07-01T10:00:00Z",
                        "private": false,
                        "topics": ["dashboard"],
                        "language": "TypeScript",
                        "stargazers_count": 2
                    }]))
                }
            }),
        );
        let addr = spawn_stub(stub).await;
        let app = app(AppState::new(config_for(format!("http://{}", addr))));

        for _ in 0..2 {
            let (status, body) = get_github(&app).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["projects"][0]["name"], "Hq Dashboard");
            assert_eq!(body["projects"][0]["language"], "TypeScript");
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unreachable_upstream_reports_failure_with_empty_list() {
        let app = app(AppState::new(config_for("http://127.0.0.1:1".to_string())));
        let (status, body) = get_github(&app).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch repos");
        assert_eq!(body["projects"], json!([]));
    }

    #[test]
    fn kebab_names_become_title_case() {
        assert_eq!(format_name("hq-dashboard"), "Hq Dashboard");
        assert_eq!(format_name("single"), "Single");
        assert_eq!(format_name("a--b"), "A  B");
    }

    #[test]
    fn private_repos_are_dropped_and_fields_mapped() {
        let repos: Vec<GitHubRepo> = serde_json::from_value(serde_json::json!([
            {
                "name": "side-project",
                "description": null,
                "html_url": "https://github.com/nobody/side-project",
                "homepage": "https://side.example",
                "pushed_at": "2026-07-01T10:00:00Z",
                "private": false,
                "topics": ["rust"],
                "language": "Rust",
                "stargazers_count": 3
            },
            {
                "name": "secrets",
                "description": "hidden",
                "html_url": "https://github.com/nobody/secrets",
                "homepage": null,
                "pushed_at": "2026-07-02T10:00:00Z",
                "private": true,
                "language": null,
                "stargazers_count": 0
            }
        ]))
        .unwrap();

        let projects = to_projects(repos);
        assert_eq!(projects.len(), 1);

        let json = serde_json::to_value(&projects[0]).unwrap();
        assert_eq!(json["id"], "side-project");
        assert_eq!(json["name"], "Side Project");
        assert_eq!(json["description"], "No description");
        assert_eq!(json["repoUrl"], "https://github.com/nobody/side-project");
        assert_eq!(json["liveUrl"], "https://side.example");
        assert_eq!(json["pushedAt"], "2026-07-01T10:00:00Z");
        assert_eq!(json["language"], "Rust");
        assert_eq!(json["topics"], serde_json::json!(["rust"]));
        assert_eq!(json["stars"], 3);
    }

}
