//! End-to-end consistency scenarios
//!
//! Runs the same client / sales rep walkthroughs against every storage
//! backend so both behave identically from the services' point of view.

use anyhow::Result;
use chrono::NaiveDate;
use std::collections::HashSet;
use tempfile::NamedTempFile;
use uuid::Uuid;

use acme_customers::models::{ClientInput, SalesRepInput};
use acme_customers::{AppState, InMemoryStore, ServiceError, SqliteStore};

fn rep_input(name: &str) -> SalesRepInput {
    SalesRepInput {
        name: name.to_string(),
        email: format!("{}@acme.test", name.to_lowercase()),
        phone: None,
    }
}

fn client_input(name: &str, sales_rep_id: Uuid) -> ClientInput {
    ClientInput {
        name: name.to_string(),
        contact_email: "buyer@acme.test".to_string(),
        visit_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(10, 0, 0).unwrap(),
        sales_rep_id,
        notes: Some("first visit".to_string()),
    }
}

async fn backends() -> Result<Vec<(&'static str, AppState, Option<NamedTempFile>)>> {
    let temp_file = NamedTempFile::new()?;
    let sqlite = SqliteStore::new(temp_file.path()).await?;
    Ok(vec![
        ("memory", AppState::from_store(InMemoryStore::new()), None),
        ("sqlite", AppState::from_store(sqlite), Some(temp_file)),
    ])
}

#[tokio::test]
async fn test_full_lifecycle_scenarios() -> Result<()> {
    for (backend, state, _guard) in backends().await? {
        // A: create rep and client, read it back
        let r1 = state.sales_reps.create(rep_input("Ana")).await?;
        let c1 = state.clients.create(client_input("Acme Co", r1)).await?;
        let stored = state.clients.get_by_id(c1).await?.expect("client stored");
        assert_eq!(stored.sales_rep_id, r1, "{}", backend);
        assert_eq!(stored.name, "Acme Co", "{}", backend);

        // B: dangling reference is refused and nothing is written
        let before = state.clients.list_all().await?;
        let missing = Uuid::new_v4();
        let err = state
            .clients
            .create(client_input("Ghost Ltd", missing))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ReferenceNotFound(id) if id == missing), "{}", backend);
        assert_eq!(state.clients.list_all().await?, before, "{}", backend);

        // C: guarded delete lists the blocking client and keeps the rep
        match state.sales_reps.delete(r1).await {
            Err(ServiceError::DependentRecordsExist(names)) => {
                assert_eq!(names, vec!["Acme Co".to_string()], "{}", backend)
            }
            other => panic!("{}: expected DependentRecordsExist, got {:?}", backend, other),
        }
        assert!(state.sales_reps.get_by_id(r1).await?.is_some(), "{}", backend);

        // D: once the client is gone the rep can go too
        assert!(state.clients.delete(c1).await?, "{}", backend);
        assert!(state.sales_reps.delete(r1).await?, "{}", backend);
        assert!(state.sales_reps.get_by_id(r1).await?.is_none(), "{}", backend);

        // E: update of an unknown client is a miss, not an insert
        let r2 = state.sales_reps.create(rep_input("Bo")).await?;
        let ghost = Uuid::new_v4();
        assert!(!state.clients.update(ghost, client_input("Nobody", r2)).await?, "{}", backend);
        assert!(state.clients.get_by_id(ghost).await?.is_none(), "{}", backend);
        assert!(state.clients.list_all().await?.is_empty(), "{}", backend);
    }
    Ok(())
}

#[tokio::test]
async fn test_update_with_bad_reference_changes_nothing() -> Result<()> {
    for (backend, state, _guard) in backends().await? {
        let r1 = state.sales_reps.create(rep_input("Ana")).await?;
        let c1 = state.clients.create(client_input("Acme Co", r1)).await?;
        let original = state.clients.get_by_id(c1).await?;

        let err = state
            .clients
            .update(c1, client_input("Acme Renamed", Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ReferenceNotFound(_)), "{}", backend);
        assert_eq!(state.clients.get_by_id(c1).await?, original, "{}", backend);
    }
    Ok(())
}

#[tokio::test]
async fn test_client_can_move_between_reps() -> Result<()> {
    for (backend, state, _guard) in backends().await? {
        let ana = state.sales_reps.create(rep_input("Ana")).await?;
        let bo = state.sales_reps.create(rep_input("Bo")).await?;
        let c1 = state.clients.create(client_input("Acme Co", ana)).await?;

        let mut moved = client_input("Acme Co", bo);
        moved.notes = None;
        assert!(state.clients.update(c1, moved).await?, "{}", backend);

        let view = state.clients.get_details(c1).await?.expect("client present");
        assert_eq!(view.sales_rep.map(|r| r.name), Some("Bo".to_string()), "{}", backend);
        assert_eq!(view.notes, None, "{}", backend);

        // Ana is free again, Bo is now guarded
        assert!(state.sales_reps.delete(ana).await?, "{}", backend);
        assert!(state.sales_reps.delete(bo).await.is_err(), "{}", backend);
    }
    Ok(())
}

#[tokio::test]
async fn test_misses_never_error() -> Result<()> {
    for (backend, state, _guard) in backends().await? {
        let unknown = Uuid::new_v4();
        assert!(!state.clients.delete(unknown).await?, "{}", backend);
        assert!(!state.sales_reps.delete(unknown).await?, "{}", backend);
        assert!(!state.sales_reps.update(unknown, rep_input("Nobody")).await?, "{}", backend);
        assert!(state.clients.get_details(unknown).await?.is_none(), "{}", backend);
        assert!(state.sales_reps.get_details(unknown).await?.is_none(), "{}", backend);
    }
    Ok(())
}

#[tokio::test]
async fn test_identifiers_are_unique() -> Result<()> {
    for (backend, state, _guard) in backends().await? {
        let rep = state.sales_reps.create(rep_input("Ana")).await?;
        let mut seen = HashSet::from([rep]);
        for i in 0..25 {
            let id = state.clients.create(client_input(&format!("Client {}", i), rep)).await?;
            assert!(seen.insert(id), "{}: duplicate id {}", backend, id);
        }
        assert_eq!(state.clients.list_all().await?.len(), 25, "{}", backend);
    }
    Ok(())
}
