//! Job template specs
//!
//! Verify templates list the jobs materialized from them.

use crate::prelude::*;
use crate::prelude::assert_eq;
use jobflow_controller::jobtemplate::on_job_added;

#[tokio::test]
async fn template_lists_jobs_from_every_flow() {
    let cluster = Cluster::new();
    cluster.submit("f1", vec![Flow::new("a")], RetainPolicy::Retain);
    let steps = vec![Flow::new("a"), Flow::new("b")];
    cluster.submit("f2", steps, RetainPolicy::Retain);
    cluster.pass("f1").await;
    cluster.pass("f2").await;

    let job = cluster.store.job(NS, "f2-a").unwrap();
    let key = on_job_added(&job).unwrap();
    assert_eq!(key, ObjectKey::new(NS, "a"));
    cluster.templates.sync(&key).await.unwrap();

    let a = cluster.store.template(NS, "a").unwrap();
    assert_eq!(a.status.job_depends_on_list, vec!["f1-a", "f2-a"]);
    let b = cluster.store.template(NS, "b").unwrap();
    assert!(b.status.job_depends_on_list.is_empty());
}

#[tokio::test]
async fn deleted_template_is_a_no_op() {
    let cluster = Cluster::new();

    let key = ObjectKey::new(NS, "gone");
    cluster.templates.sync(&key).await.unwrap();

    assert!(cluster.recorder.events().is_empty());
}
