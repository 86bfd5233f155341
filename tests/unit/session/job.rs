use super::*;
use crate::pose::source::InMemoryLandmarkSource;

#[test]
fn job_reports_run_errors_on_join() {
    let paths = AnalysisPaths::new("/nonexistent/crux/uploads", "/nonexistent/crux/outputs");
    let job = OverlayJob::spawn(
        "feedface-0000",
        paths,
        Arc::new(InMemoryLandmarkSource::new()),
        OverlayOpts::default(),
    )
    .unwrap();
    assert_eq!(job.analysis_id(), "feedface-0000");
    let err = job.join().unwrap_err();
    assert!(matches!(err, OverlayError::NotFound(_)));
}

#[test]
fn independent_jobs_run_concurrently() {
    let jobs: Vec<OverlayJob> = (0..3)
        .map(|i| {
            OverlayJob::spawn(
                format!("job{i}"),
                AnalysisPaths::default(),
                Arc::new(InMemoryLandmarkSource::new()),
                OverlayOpts::default(),
            )
            .unwrap()
        })
        .collect();
    for job in jobs {
        assert!(job.join().is_err());
    }
}
