//! Bootstrap and navigation metrics as seen by a Prometheus recorder.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;

use folio_viewer::config::ApiConfig;
use folio_viewer::http::ApiClient;
use folio_viewer::identity::{IdentityError, IdentityProvider, Session};
use folio_viewer::lifecycle::{bootstrap, MountPoint};
use folio_viewer::routing::Router;

struct StaticProvider(Result<Session, &'static str>);

impl IdentityProvider for StaticProvider {
    async fn init(&self) -> Result<Session, IdentityError> {
        self.0
            .clone()
            .map_err(|reason| IdentityError::Protocol(reason.to_string()))
    }
}

fn sample(output: &str, name: &str, labels: &[&str]) -> Option<f64> {
    output
        .lines()
        .filter(|line| line.starts_with(name))
        .find(|line| labels.iter().all(|label| line.contains(label)))
        .and_then(|line| line.rsplit(' ').next())
        .and_then(|value| value.parse().ok())
}

#[test]
fn test_bootstrap_and_navigation_are_counted() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    // The local recorder is per thread; the current-thread runtime keeps every poll here.
    metrics::with_local_recorder(&recorder, || {
        runtime.block_on(async {
            let api = ApiClient::new(&ApiConfig::default()).unwrap();
            let router = Arc::new(Router::default_table());

            let mut failed = MountPoint::new("#failed");
            let provider = StaticProvider(Err("provider offline"));
            assert!(!bootstrap(&provider, &api, router.clone(), &mut failed).await.is_mounted());

            let mut unauthenticated = MountPoint::new("#anon");
            let provider = StaticProvider(Ok(Session::unauthenticated()));
            assert!(!bootstrap(&provider, &api, router.clone(), &mut unauthenticated).await.is_mounted());

            let mut root = MountPoint::new("#app");
            let provider = StaticProvider(Ok(Session::bearer("token")));
            assert!(bootstrap(&provider, &api, router, &mut root).await.is_mounted());

            let app = root.take().unwrap();
            app.navigate("/traditions").unwrap();
            app.navigate("/tradition/syriac/ms-1/2r").unwrap();
            app.navigate("/tradition/syriac/ms-1/2r").unwrap();
            assert!(app.navigate("/nowhere").is_err());
        });
    });

    let output = handle.render();
    for outcome in ["mounted", "not_authenticated", "failed"] {
        let label = format!("outcome=\"{}\"", outcome);
        assert_eq!(
            sample(&output, "folio_bootstrap_total{", &[label.as_str()]),
            Some(1.0),
            "{}",
            outcome
        );
    }
    assert_eq!(
        sample(&output, "folio_navigation_total{", &["route=\"traditions\"", "status=\"ok\""]),
        Some(1.0)
    );
    assert_eq!(
        sample(&output, "folio_navigation_total{", &["route=\"FolioViewer\"", "status=\"ok\""]),
        Some(2.0)
    );
    assert_eq!(
        sample(&output, "folio_navigation_total{", &["status=\"not_found\""]),
        Some(1.0)
    );
    assert_eq!(sample(&output, "folio_bootstrap_duration_seconds_count", &[]), Some(3.0));
}
