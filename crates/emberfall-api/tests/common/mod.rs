//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::TimeZone;
use emberfall_api::routes;
use emberfall_api::state::AppState;
use emberfall_battle::application::battle_loop::{BattleLoopService, LoopConfig};
use emberfall_battle::application::battle_service::BattleService;
use emberfall_battle::application::monster::SimpleMonsterStrategy;
use emberfall_battle::domain::combat_state::{CombatStats, Element, Race};
use emberfall_battle::domain::repositories::{MonsterSnapshot, PlayerSnapshot, SpotConfig};
use emberfall_store::{
    InMemoryActionRepository, InMemoryAreaRepository, InMemoryBattleRepository,
    InMemoryEventPublisher, InMemoryMonsterRepository, InMemoryPlayerRepository, TracingNotifier,
    seed_action_catalog,
};
use emberfall_test_support::{FixedClock, MockRng};
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

/// A full-health human player snapshot with the given actions.
pub fn player_snapshot(name: &str, speed: u32, action_ids: Vec<Uuid>) -> PlayerSnapshot {
    PlayerSnapshot {
        player_id: Uuid::new_v4(),
        name: name.to_owned(),
        race: Race::Human,
        element: Element::Neutral,
        current_hp: 100,
        max_hp: 100,
        current_mp: 30,
        max_mp: 30,
        stats: CombatStats {
            attack: 20,
            defense: 10,
            speed,
            critical_rate: 0.0,
            evasion_rate: 0.0,
        },
        action_ids,
    }
}

/// A beast monster template with the given actions.
pub fn monster_snapshot(name: &str, speed: u32, action_ids: Vec<Uuid>) -> MonsterSnapshot {
    MonsterSnapshot {
        monster_id: Uuid::new_v4(),
        name: name.to_owned(),
        race: Race::Beast,
        element: Element::Neutral,
        max_hp: 60,
        max_mp: 20,
        stats: CombatStats {
            attack: 15,
            defense: 8,
            speed,
            critical_rate: 0.0,
            evasion_rate: 0.0,
        },
        action_ids,
    }
}

/// A fully wired app over the in-memory store, seeded with one player
/// (Strike learned), one Bite monster, and one single-monster spot.
pub struct TestApp {
    pub router: Router,
    pub players: Arc<InMemoryPlayerRepository>,
    pub spot_id: Uuid,
    pub player_id: Uuid,
    pub strike_id: Uuid,
    pub bite_id: Uuid,
}

/// Builds the test app. `max_players` caps the seeded spot.
pub async fn build_test_app(max_players: usize) -> TestApp {
    let catalog = seed_action_catalog();
    let strike_id = catalog[0].id;
    let bite_id = catalog.iter().find(|a| a.name == "Bite").unwrap().id;

    let battles = Arc::new(InMemoryBattleRepository::new());
    let actions = Arc::new(InMemoryActionRepository::with_actions(catalog));
    let players = Arc::new(InMemoryPlayerRepository::new());
    let monsters = Arc::new(InMemoryMonsterRepository::new());
    let areas = Arc::new(InMemoryAreaRepository::new());

    // Player outspeeds the monster so the first turn is theirs.
    let player = player_snapshot("Aria", 10, vec![strike_id]);
    let player_id = player.player_id;
    players.insert(player).await;

    let monster = monster_snapshot("Wolf", 5, vec![bite_id]);
    let monster_id = monster.monster_id;
    monsters.insert(monster).await;

    let spot_id = Uuid::new_v4();
    areas
        .insert(SpotConfig {
            spot_id,
            monster_ids: vec![monster_id],
            max_players,
            max_turns: 30,
        })
        .await;

    let service = Arc::new(BattleService::new(
        battles,
        actions,
        Arc::clone(&players) as Arc<dyn emberfall_battle::domain::repositories::PlayerRepository>,
        monsters,
        areas,
        Arc::new(InMemoryEventPublisher::new()),
        Arc::new(TracingNotifier),
        Arc::new(SimpleMonsterStrategy),
        Arc::new(FixedClock(
            chrono::Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        )),
        Box::new(MockRng),
    ));
    let loops = Arc::new(BattleLoopService::new(
        Arc::clone(&service),
        LoopConfig {
            player_action_timeout: Duration::from_secs(30),
            inter_turn_delay: Duration::from_millis(10),
        },
    ));
    let app_state = AppState::new(service, loops);

    let router = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/battles", routes::battle::router())
        .with_state(app_state);

    TestApp {
        router,
        players,
        spot_id,
        player_id,
        strike_id,
        bite_id,
    }
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}
