//! Shared fixtures for the lifecycle integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use sfl_core::{ActorContext, Amount, UserId};
use sfl_lifecycle::{
    InMemoryContractStore, InMemoryUserDirectory, LifecycleConfig, LifecycleManager, RecordingSink,
};
use sfl_state::{Contract, ContractDraft};
use sfl_store_client::UserProfile;

pub const CLIENT_SIG: &str = "data:image/png;base64,Y2xpZW50";
pub const FREELANCER_SIG: &str = "data:image/png;base64,ZnJlZWxhbmNlcg==";

pub struct Harness {
    pub store: Arc<InMemoryContractStore>,
    pub users: Arc<InMemoryUserDirectory>,
    pub sink: Arc<RecordingSink>,
    pub manager: Arc<LifecycleManager>,
}

pub fn harness() -> Harness {
    harness_with_timeout(Duration::from_secs(2))
}

pub fn harness_with_timeout(timeout: Duration) -> Harness {
    let store = Arc::new(InMemoryContractStore::new());
    let users = Arc::new(InMemoryUserDirectory::new());
    let sink = Arc::new(RecordingSink::new());
    let manager = Arc::new(LifecycleManager::new(
        store.clone(),
        users.clone(),
        sink.clone(),
        LifecycleConfig::with_timeout(timeout),
    ));
    users.insert(UserProfile {
        id: UserId(1),
        first_name: "Grace".into(),
        last_name: "Hopper".into(),
        role: Some("CLIENT".into()),
        email: Some("grace@example.com".into()),
    });
    Harness {
        store,
        users,
        sink,
        manager,
    }
}

pub fn client() -> ActorContext {
    ActorContext::client(1)
}

pub fn freelancer() -> ActorContext {
    ActorContext::freelancer(2)
}

pub fn admin() -> ActorContext {
    ActorContext::admin(100)
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 10).unwrap()
}

pub fn draft() -> ContractDraft {
    ContractDraft {
        client_id: UserId(1),
        freelancer_id: UserId(2),
        project_application_id: None,
        offer_application_id: None,
        title: "Website Redesign".into(),
        description: Some("Rebuild the marketing site.".into()),
        terms: "Deliverables in three milestones, net 15.".into(),
        amount: Amount::from_major_units(500),
        start_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 2, 14).unwrap(),
    }
}

impl Harness {
    pub async fn drafted(&self) -> Contract {
        self.manager
            .create_contract(&client(), &draft(), today())
            .await
            .unwrap()
    }

    pub async fn pending(&self) -> Contract {
        let c = self.drafted().await;
        self.manager.submit_for_signature(&client(), &c).await.unwrap()
    }

    pub async fn active(&self) -> Contract {
        let c = self.pending().await;
        let c = self
            .manager
            .sign(&client(), &c, CLIENT_SIG)
            .await
            .unwrap()
            .into_contract();
        self.manager
            .sign(&freelancer(), &c, FREELANCER_SIG)
            .await
            .unwrap()
            .into_contract()
    }
}
