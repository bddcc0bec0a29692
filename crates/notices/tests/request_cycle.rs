//! Post/redirect/get cycle against the file-backed log: notices added while
//! handling a POST show up on the following GET and are gone afterwards.

use std::sync::Arc;

use nb_domain::config::NoticesConfig;
use nb_domain::notice::{RequestContext, SessionToken};
use nb_notices::{JsonlLog, NoticeLog, NoticeStore, Verbatim, NO_ARGS};

fn request(log: Arc<JsonlLog>, config: &NoticesConfig, sid: &str, ctx: RequestContext) -> NoticeStore {
    let mut store = NoticeStore::new(config, log, Arc::new(Verbatim));
    store.load(SessionToken::new(sid), ctx);
    store
}

#[test]
fn notices_cross_one_redirect() {
    let dir = tempfile::tempdir().unwrap();
    let config = NoticesConfig::default();

    {
        let log = Arc::new(JsonlLog::open(dir.path()).unwrap());
        let mut post = request(log, &config, "visitor-a", RequestContext::default());
        assert!(post.add_one("Reply posted to %s", "success", &["General"]));
        assert!(post.add_one("Attachment too large", "error", NO_ARGS));
    }

    // Fresh process state: the log is reopened from disk.
    let log = Arc::new(JsonlLog::open(dir.path()).unwrap());
    let mut get = request(log.clone(), &config, "visitor-a", RequestContext::default());
    assert_eq!(
        get.get_notices(),
        r#"<p class="error">Attachment too large</p><p class="success">Reply posted to General</p>"#
    );

    let again = request(log.clone(), &config, "visitor-a", RequestContext::default());
    assert!(again.is_empty());
    assert!(log.query("visitor-a", again.types()).unwrap().is_empty());
}

#[test]
fn sessions_do_not_see_each_other() {
    let dir = tempfile::tempdir().unwrap();
    let config = NoticesConfig::default();
    let log = Arc::new(JsonlLog::open(dir.path()).unwrap());

    let mut a = request(log.clone(), &config, "visitor-a", RequestContext::default());
    a.add_one("For A", "neutral", NO_ARGS);

    let mut b = request(log.clone(), &config, "visitor-b", RequestContext::default());
    assert!(b.is_empty());
    b.add_one("For B", "neutral", NO_ARGS);
    assert!(b.clear());

    let a_next = request(log, &config, "visitor-a", RequestContext::default());
    assert_eq!(a_next.notices().messages().count(), 1);
}

#[test]
fn extra_types_round_trip_with_their_timeouts() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = NoticesConfig {
        additional_types: vec!["warning".into()],
        ..Default::default()
    };
    config.timeout_overrides.insert("timeout_warning".into(), 20_000);
    let log = Arc::new(JsonlLog::open(dir.path()).unwrap());

    let mut first = request(log.clone(), &config, "v", RequestContext::default());
    first.add_one("Disk almost full", "WARNING", NO_ARGS);

    let mut second = request(log, &config, "v", RequestContext { is_ajax: false, is_admin: true });
    assert_eq!(second.timeout_for(&"warning".into()), 20_000);
    let html = second.show();
    assert!(html.contains("notice-warning"));
    assert!(html.contains("Disk almost full"));
    assert!(second.is_empty());
}
