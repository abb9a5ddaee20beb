//! Integration tests for leader queries against an embedded raft server

use meta_cluster::{
    ClusterConfig, ClusterError, EmbeddedConsensusAdapter, LeaderQuery, LeaderRouter,
    LocalRaftServer, MemberConfig, NodeId, RaftServer, Route, NO_LEADER,
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::time::sleep;
use tracing_subscriber::fmt::try_init;

fn running_server(local: u64, lead: u64) -> Arc<LocalRaftServer> {
    let server = Arc::new(LocalRaftServer::new(NodeId::new(local)));
    server.start();
    server.set_lead(lead);
    server
}

fn cluster_config(local: u64) -> ClusterConfig {
    ClusterConfig {
        node_id: NodeId::new(local),
        cluster_name: "integration-cluster".to_string(),
        members: (1..=3)
            .map(|i| MemberConfig {
                id: NodeId::new(i),
                name: format!("meta-{}", i),
                peer_address: format!("127.0.0.1:{}", 12380 + i).parse().unwrap(),
            })
            .collect(),
        ..Default::default()
    }
}

/// Engine leader 7 is reported as leader 7
#[test]
fn test_reports_engine_leader() {
    let _ = try_init();

    let server = running_server(1, 7);
    let adapter = EmbeddedConsensusAdapter::new(&server);

    assert_eq!(adapter.current_leader_id().unwrap(), NodeId::new(7));
}

/// The "no leader" sentinel is an error, never a node id
#[test]
fn test_no_leader_is_an_error() {
    let _ = try_init();

    let server = running_server(1, NO_LEADER);
    let adapter = EmbeddedConsensusAdapter::new(&server);

    let err = adapter.current_leader_id().unwrap_err();
    assert!(matches!(err, ClusterError::NoLeader));
    assert!(err.to_string().contains("No leader"));
}

/// 100 concurrent callers see the same stable leader
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_queries_agree() {
    let _ = try_init();

    let server = running_server(1, 42);
    let query: Arc<dyn LeaderQuery> = Arc::new(EmbeddedConsensusAdapter::new(&server));

    let handles: Vec<_> = (0..100)
        .map(|_| {
            let query = query.clone();
            tokio::spawn(async move { query.current_leader_id() })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), NodeId::new(42));
    }
}

/// Same from plain OS threads borrowing one adapter
#[test]
fn test_concurrent_queries_from_threads() {
    let server = running_server(1, 42);
    let adapter = EmbeddedConsensusAdapter::new(&server);

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..100)
            .map(|_| scope.spawn(|| adapter.current_leader_id()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.len(), 100);
    for result in results {
        assert_eq!(result.unwrap(), NodeId::new(42));
    }
}

/// Queries never write to the server
#[test]
fn test_queries_leave_server_untouched() {
    let server = running_server(1, 3);
    let adapter = EmbeddedConsensusAdapter::new(&server);

    let lead_before = server.lead();
    let status_before = server.status();
    let changes_before = server.lead_changes();

    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..1000 {
                    adapter.current_leader_id().unwrap();
                }
            });
        }
    });

    assert_eq!(server.lead(), lead_before);
    assert_eq!(server.status(), status_before);
    assert_eq!(server.lead_changes(), changes_before);
}

/// Queries keep working while the raft loop publishes leader changes
#[test]
fn test_queries_during_leader_changes() {
    let server = running_server(1, 1);
    let adapter = EmbeddedConsensusAdapter::new(&server);

    thread::scope(|scope| {
        scope.spawn(|| {
            for lead in [2, NO_LEADER, 3, 1] {
                server.set_lead(lead);
                thread::sleep(Duration::from_millis(1));
            }
        });

        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..500 {
                    match adapter.current_leader_id() {
                        Ok(id) => assert!([1, 2, 3].contains(&id.get())),
                        Err(e) => assert!(matches!(e, ClusterError::NoLeader)),
                    }
                }
            });
        }
    });

    assert_eq!(adapter.current_leader_id().unwrap(), NodeId::new(1));
}

/// The adapter never outlives the server's usefulness
#[test]
fn test_server_shutdown_and_drop() {
    let server = running_server(1, 2);
    let adapter = EmbeddedConsensusAdapter::new(&server);

    server.stop();
    assert!(matches!(
        adapter.current_leader_id(),
        Err(ClusterError::EngineUnavailable(_))
    ));

    drop(server);
    assert!(matches!(
        adapter.current_leader_id(),
        Err(ClusterError::EngineUnavailable(_))
    ));
}

/// Writes follow leadership as it moves between members
#[tokio::test]
async fn test_routing_follows_election() {
    let _ = try_init();

    let server = running_server(1, NO_LEADER);
    let router = LeaderRouter::new(EmbeddedConsensusAdapter::new(&server), cluster_config(1));

    assert!(matches!(
        router.ensure_leader(),
        Err(ClusterError::NotLeader { leader: None })
    ));
    assert!(router.status().error.is_some());

    let elector = server.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(20)).await;
        elector.set_lead(2);
    });

    assert_eq!(router.wait_for_leader().await.unwrap(), NodeId::new(2));
    assert_eq!(
        router.route().unwrap(),
        Route::Forward {
            leader: NodeId::new(2),
            address: "127.0.0.1:12382".parse().unwrap(),
        }
    );

    server.set_lead(1);
    assert_eq!(router.route().unwrap(), Route::Local);
    assert!(router.ensure_leader().is_ok());

    let status = router.status();
    assert!(status.is_leader);
    assert_eq!(status.leader_id, Some(NodeId::new(1)));
}
