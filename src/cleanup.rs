use anyhow::{Context, Result};
use colored::*;
use crate::api::BrowserStackApi;
use crate::error::CleanupError;
use crate::json::{as_app_record, AppRecord, RecentUploads};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CleanupReport {
    pub custom_id: String,
    pub deleted: Vec<AppRecord>,
    pub skipped: usize,
    pub dry_run: bool,
}

impl CleanupReport {
    pub fn display(&self) {
        let verb = if self.dry_run { "Would delete" } else { "Deleted" };
        let mut summary = format!("{} {} upload(s) for custom id '{}'", verb, self.deleted.len(), self.custom_id);
        if self.skipped > 0 {
            summary.push_str(&format!(", skipped {} malformed entr{}", self.skipped, if self.skipped == 1 { "y" } else { "ies" }));
        }
        println!("{}", summary.green());
    }
}

// Annotation lines stay uncoloured so the CI runner recognises them.
pub(crate) fn print_warning(message: &str) {
    eprintln!("::warning::{}", message);
}

pub(crate) fn print_error(message: &str) {
    eprintln!("::error::{}", message);
}

/// Deletes every recent upload tagged with `custom_id`, in listing order.
///
/// A failing delete aborts the run; uploads deleted before it stay deleted.
pub async fn run(api: &BrowserStackApi, custom_id: &str, dry_run: bool) -> Result<CleanupReport> {
    if custom_id.trim().is_empty() {
        return Err(CleanupError::Usage("custom id must not be empty".to_string()).into());
    }

    let mut report = CleanupReport {
        custom_id: custom_id.to_string(),
        dry_run,
        ..CleanupReport::default()
    };

    let entries = match api.recent_uploads(custom_id).await? {
        RecentUploads::NoResults => {
            println!("No uploads found for custom id '{}'.", custom_id);
            return Ok(report);
        }
        RecentUploads::Message(message) => return Err(CleanupError::Remote(message).into()),
        RecentUploads::Apps(entries) => entries,
    };

    for entry in &entries {
        let Some(app) = as_app_record(entry) else {
            print_warning(&format!("Skipping malformed upload entry: {}", entry));
            report.skipped += 1;
            continue;
        };

        if dry_run {
            println!("* Would delete {} ({})", app.app_name, app.app_id.dimmed());
        } else {
            println!("* Deleting {}…", app.app_name);
            api.delete_app(&app.app_id)
                .await
                .with_context(|| format!("Failed to delete '{}' ({})", app.app_name, app.app_id))?;
        }
        report.deleted.push(app);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use httpmock::prelude::*;
    use serde_json::json;
    use url::Url;

    fn api_for(server: &MockServer) -> BrowserStackApi {
        let config = Config {
            api_url: Url::parse(&server.url("/app-live/")).unwrap(),
            user: "ci-user".to_string(),
            key: "ci-key".to_string(),
        };
        BrowserStackApi::new(&config)
    }

    fn record(app_id: &str, app_name: &str) -> AppRecord {
        AppRecord { app_id: app_id.to_string(), app_name: app_name.to_string() }
    }

    #[tokio::test]
    async fn test_no_results_deletes_nothing() -> Result<()> {
        let server = MockServer::start();
        let list = server.mock(|when, then| {
            when.method(GET).path("/app-live/recent_apps/nightly");
            then.status(200).json_body(json!({"message": "No results found"}));
        });
        let delete = server.mock(|when, then| {
            when.method(DELETE);
            then.status(200);
        });

        let report = run(&api_for(&server), "nightly", false).await?;

        list.assert();
        delete.assert_hits(0);
        assert!(report.deleted.is_empty());
        assert_eq!(report.skipped, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_deletes_each_record_once() -> Result<()> {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/app-live/recent_apps/nightly");
            then.status(200).json_body(json!([
                {"app_id": "a1", "app_name": "one.apk", "uploaded_at": "2024-01-01"},
                {"app_id": "a2", "app_name": "two.apk"},
                {"app_id": "a3", "app_name": "three.ipa"}
            ]));
        });
        let deletes: Vec<_> = ["a1", "a2", "a3"]
            .iter()
            .map(|app_id| {
                server.mock(|when, then| {
                    when.method(DELETE).path(format!("/app-live/app/delete/{}", app_id));
                    then.status(200).json_body(json!({"success": true}));
                })
            })
            .collect();

        let report = run(&api_for(&server), "nightly", false).await?;

        for delete in &deletes {
            delete.assert_hits(1);
        }
        assert_eq!(report.deleted, vec![record("a1", "one.apk"), record("a2", "two.apk"), record("a3", "three.ipa")]);
        Ok(())
    }

    #[tokio::test]
    async fn test_remote_message_fails_without_deleting() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/app-live/recent_apps/nightly");
            then.status(200).json_body(json!({"message": "Invalid credentials"}));
        });
        let delete = server.mock(|when, then| {
            when.method(DELETE);
            then.status(200);
        });

        let result = run(&api_for(&server), "nightly", false).await;

        delete.assert_hits(0);
        let err = result.unwrap_err();
        assert!(matches!(err.downcast_ref::<CleanupError>(), Some(CleanupError::Remote(m)) if m == "Invalid credentials"));
    }

    #[tokio::test]
    async fn test_malformed_entries_are_skipped() -> Result<()> {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/app-live/recent_apps/nightly");
            then.status(200).json_body(json!([
                "not-an-object",
                {"app_id": "a1", "app_name": "one.apk"},
                {"app_name": "missing-id.apk"},
                {"app_id": "a2", "app_name": "two.apk"}
            ]));
        });
        let first = server.mock(|when, then| {
            when.method(DELETE).path("/app-live/app/delete/a1");
            then.status(200);
        });
        let second = server.mock(|when, then| {
            when.method(DELETE).path("/app-live/app/delete/a2");
            then.status(200);
        });

        let report = run(&api_for(&server), "nightly", false).await?;

        first.assert_hits(1);
        second.assert_hits(1);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.deleted, vec![record("a1", "one.apk"), record("a2", "two.apk")]);
        Ok(())
    }

    #[tokio::test]
    async fn test_failing_delete_aborts_after_prior_deletions() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/app-live/recent_apps/nightly");
            then.status(200).json_body(json!([
                {"app_id": "a1", "app_name": "one.apk"},
                {"app_id": "a2", "app_name": "two.apk"},
                {"app_id": "a3", "app_name": "three.apk"}
            ]));
        });
        let first = server.mock(|when, then| {
            when.method(DELETE).path("/app-live/app/delete/a1");
            then.status(200);
        });
        let second = server.mock(|when, then| {
            when.method(DELETE).path("/app-live/app/delete/a2");
            then.status(403).body("forbidden");
        });
        let third = server.mock(|when, then| {
            when.method(DELETE).path("/app-live/app/delete/a3");
            then.status(200);
        });

        let result = run(&api_for(&server), "nightly", false).await;

        first.assert_hits(1);
        second.assert_hits(1);
        third.assert_hits(0);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to delete 'two.apk' (a2)"));
        assert!(matches!(err.downcast_ref::<CleanupError>(), Some(CleanupError::Http { .. })));
    }

    #[tokio::test]
    async fn test_dry_run_issues_no_deletes() -> Result<()> {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/app-live/recent_apps/nightly");
            then.status(200).json_body(json!([{"app_id": "a1", "app_name": "one.apk"}]));
        });
        let delete = server.mock(|when, then| {
            when.method(DELETE);
            then.status(200);
        });

        let report = run(&api_for(&server), "nightly", true).await?;

        delete.assert_hits(0);
        assert!(report.dry_run);
        assert_eq!(report.deleted, vec![record("a1", "one.apk")]);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_custom_id_is_usage_error_before_network() {
        let server = MockServer::start();
        let any = server.mock(|_when, then| {
            then.status(200);
        });

        let result = run(&api_for(&server), "  ", false).await;

        any.assert_hits(0);
        assert!(matches!(result.unwrap_err().downcast_ref::<CleanupError>(), Some(CleanupError::Usage(_))));
    }
}
