//! End-to-end session command scenarios over the HTTP API

mod harness;

use harness::TestServer;
use serde_json::{json, Value};

async fn add_combatant(server: &TestServer, name: &str, initiative: i32, max_hp: i32) {
    let resp = server
        .post(
            "/session/combatants",
            &json!({"name": name, "initiative": initiative, "max_hp": max_hp}),
        )
        .await
        .expect("Failed to add combatant");
    assert_eq!(resp.status(), 201, "add {} failed", name);
}

#[tokio::test]
async fn test_roll_endpoint() {
    let server = TestServer::start().await.expect("Failed to start server");

    let body: Value = server
        .post("/roll", &json!({"expr": "3d6+2"}))
        .await
        .expect("Failed to roll")
        .json()
        .await
        .expect("Failed to parse JSON");

    let rolls = body["rolls"].as_array().expect("rolls missing");
    assert_eq!(rolls.len(), 3);
    let sum: i64 = rolls.iter().map(|r| r.as_i64().unwrap()).sum();
    assert_eq!(body["total"], json!(sum + 2));
    assert_eq!(body["modifier"], 2);

    // Advantage exposes both raw d20s, sorted, and the selection rule
    let body: Value = server
        .post("/roll", &json!({"expr": "1d20+5", "advantage": true}))
        .await
        .expect("Failed to roll")
        .json()
        .await
        .expect("Failed to parse JSON");
    let outcomes = body["d20_outcomes"].as_array().expect("outcomes missing");
    assert!(outcomes[0].as_i64().unwrap() <= outcomes[1].as_i64().unwrap());
    assert_eq!(body["rolls"][0], outcomes[1].clone());
    assert_eq!(body["mode"], "advantage");
}

#[tokio::test]
async fn test_roll_errors() {
    let server = TestServer::start().await.expect("Failed to start server");

    for (req, fragment) in [
        (json!({"expr": "1d7"}), "die size"),
        (json!({"expr": "banana"}), "invalid dice expression"),
        (json!({"expr": "1d20", "advantage": true, "disadvantage": true}), "both"),
        (json!({"expr": "2d20", "advantage": true}), "single d20"),
    ] {
        let resp = server.post("/roll", &req).await.expect("Failed to roll");
        assert_eq!(resp.status(), 400, "expected 400 for {}", req);
        let body: Value = resp.json().await.expect("Failed to parse JSON");
        let error = body["error"].as_str().unwrap();
        assert!(error.contains(fragment), "error '{}' missing '{}'", error, fragment);
    }
}

#[tokio::test]
async fn test_initiative_order_and_turn_cycle() {
    let server = TestServer::start().await.expect("Failed to start server");

    add_combatant(&server, "A", 15, 20).await;
    add_combatant(&server, "B", 20, 30).await;
    add_combatant(&server, "C", 10, 10).await;

    let body: Value = server
        .get("/session")
        .await
        .expect("Failed to get session")
        .json()
        .await
        .expect("Failed to parse JSON");
    let names: Vec<&str> = body["initiative_order"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["B", "A", "C"]);
    assert_eq!(body["combat_round"], 1);
    assert_eq!(body["current_turn_idx"], 0);

    // Cycle: A, C, then B again with the round wrapping exactly then
    for (expected, new_round, round) in [("A", false, 1), ("C", false, 1), ("B", true, 2)] {
        let body: Value = server
            .post("/session/turn/next", &json!({}))
            .await
            .expect("Failed to advance turn")
            .json()
            .await
            .expect("Failed to parse JSON");
        assert_eq!(body["combatant"], expected);
        assert_eq!(body["new_round"], new_round);
        assert_eq!(body["round"], round);
    }
}

#[tokio::test]
async fn test_duplicate_and_unknown_combatants() {
    let server = TestServer::start().await.expect("Failed to start server");
    add_combatant(&server, "Grug", 12, 15).await;

    let resp = server
        .post("/session/combatants", &json!({"name": "Grug", "initiative": 3, "max_hp": 1}))
        .await
        .expect("Failed to post");
    assert_eq!(resp.status(), 409);

    let resp = server.get("/session/combatants/Nobody").await.expect("Failed to get");
    assert_eq!(resp.status(), 404);

    let resp = server.delete("/session/combatants/Nobody").await.expect("Failed to delete");
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_remove_active_combatant_keeps_pointer_valid() {
    let server = TestServer::start().await.expect("Failed to start server");
    add_combatant(&server, "A", 15, 20).await;
    add_combatant(&server, "B", 20, 30).await;
    add_combatant(&server, "C", 10, 10).await;

    // Advance to C (the last slot), then remove it
    server.post("/session/turn/next", &json!({})).await.unwrap();
    server.post("/session/turn/next", &json!({})).await.unwrap();

    let resp = server.delete("/session/combatants/C").await.expect("Failed to delete");
    assert_eq!(resp.status(), 200);

    let body: Value = server
        .get("/session/turn")
        .await
        .expect("Failed to get turn")
        .json()
        .await
        .expect("Failed to parse JSON");
    // Pointer wrapped to the front rather than running past the end
    assert_eq!(body["turn_idx"], 0);
    assert_eq!(body["combatant"]["name"], "B");
}

#[tokio::test]
async fn test_damage_and_heal_clamping() {
    let server = TestServer::start().await.expect("Failed to start server");
    add_combatant(&server, "Tank", 18, 40).await;

    let body: Value = server
        .post("/session/combatants/Tank/damage", &json!({"amount": 9999}))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["current_hp"], 0);

    // Negative amounts are treated as zero
    let body: Value = server
        .post("/session/combatants/Tank/heal", &json!({"amount": -50}))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["current_hp"], 0);

    let body: Value = server
        .post("/session/combatants/Tank/heal", &json!({"amount": 9999}))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["current_hp"], 40);
    assert_eq!(body["max_hp"], 40);

    // Lowering max re-clamps current
    let body: Value = server
        .put("/session/combatants/Tank/max-hp", &json!({"max_hp": 25}))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["max_hp"], 25);
    assert_eq!(body["current_hp"], 25);
}

#[tokio::test]
async fn test_status_effect_decays_at_round_wrap() {
    let server = TestServer::start().await.expect("Failed to start server");
    add_combatant(&server, "A", 15, 20).await;
    add_combatant(&server, "B", 20, 30).await;

    let resp = server
        .post(
            "/session/combatants/A/effects",
            &json!({"name": "stunned", "duration_rounds": 1}),
        )
        .await
        .expect("Failed to apply effect");
    assert_eq!(resp.status(), 201);

    // Re-applying is a no-op success, not a duplicate
    let resp = server
        .post(
            "/session/combatants/A/effects",
            &json!({"name": "stunned", "duration_rounds": 10}),
        )
        .await
        .expect("Failed to re-apply effect");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["added"], false);

    // Present mid-round
    let body: Value = server
        .post("/session/turn/next", &json!({}))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["new_round"], false);
    let a: Value = server
        .get("/session/combatants/A")
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(a["status_effects"][0]["name"], "stunned");
    assert_eq!(a["status_effects"][0]["duration_rounds"], 1);

    // Gone exactly at the wrap, reported in the advance
    let body: Value = server
        .post("/session/turn/next", &json!({}))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["new_round"], true);
    assert_eq!(body["expired_effects"][0]["combatant"], "A");
    assert_eq!(body["expired_effects"][0]["effect"], "stunned");

    let a: Value = server
        .get("/session/combatants/A")
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(a["status_effects"], json!([]));
}

#[tokio::test]
async fn test_time_advance() {
    let server = TestServer::start().await.expect("Failed to start server");

    let body: Value = server
        .post("/session/time", &json!({"hours": 13, "minutes": 30}))
        .await
        .expect("Failed to advance time")
        .json()
        .await
        .expect("Failed to parse JSON");

    // Noon day 1 + 13h30m = 01:30 on day 2
    assert_eq!(body["game_time"], json!({"year": 1491, "day": 2, "hour": 1, "minute": 30}));
    assert_eq!(body["display"], "Year 1491, Day 2, 01:30");

    // Extreme deltas saturate; the calendar fields stay in range
    let body: Value = server
        .post("/session/time", &json!({"hours": i64::MAX}))
        .await
        .expect("Failed to advance time")
        .json()
        .await
        .expect("Failed to parse JSON");
    let hour = body["game_time"]["hour"].as_i64().unwrap();
    let day = body["game_time"]["day"].as_i64().unwrap();
    assert!((0..24).contains(&hour));
    assert!((1..=365).contains(&day));
}

#[tokio::test]
async fn test_snapshot_export_import_round_trip() {
    let server = TestServer::start().await.expect("Failed to start server");
    add_combatant(&server, "A", 15, 20).await;
    add_combatant(&server, "B", 20, 30).await;
    server.post("/session/turn/next", &json!({})).await.unwrap();
    server
        .post("/session/combatants/B/effects", &json!({"name": "blessed", "duration_rounds": 3}))
        .await
        .unwrap();

    let snapshot: Value = server
        .get("/session")
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Wipe the session, then restore from the exported snapshot
    server.post("/session/reset", &json!({})).await.unwrap();
    let resp = server.put("/session", &snapshot).await.expect("Failed to import");
    assert_eq!(resp.status(), 200);

    let restored: Value = server.get("/session").await.unwrap().json().await.unwrap();
    assert_eq!(restored, snapshot);
}

#[tokio::test]
async fn test_invalid_snapshot_import_resets_session() {
    let server = TestServer::start().await.expect("Failed to start server");
    add_combatant(&server, "A", 15, 20).await;

    let resp = server
        .put(
            "/session",
            &json!({
                "initiative_order": [],
                "current_turn_idx": "not a number",
                "combat_round": 1,
                "game_time": {"year": 1491, "day": 1, "hour": 12, "minute": 0}
            }),
        )
        .await
        .expect("Failed to put");
    assert_eq!(resp.status(), 400);

    // Session is the documented default-reset state, not partially applied
    let body: Value = server.get("/session").await.unwrap().json().await.unwrap();
    assert_eq!(body["initiative_order"], json!([]));
    assert_eq!(body["combat_round"], 0);
    assert_eq!(body["current_turn_idx"], 0);
    assert_eq!(
        body["game_time"],
        json!({"year": 1491, "day": 1, "hour": 12, "minute": 0})
    );
}

#[tokio::test]
async fn test_keyed_save_and_load() {
    let server = TestServer::start().await.expect("Failed to start server");
    add_combatant(&server, "Rogue", 17, 22).await;

    let resp = server
        .post("/session/save", &json!({"key": "session_1"}))
        .await
        .expect("Failed to save");
    assert_eq!(resp.status(), 200);
    assert!(server.data_dir().join("session_1.json").exists());

    // Mutate, then load the saved snapshot back
    server
        .post("/session/combatants/Rogue/damage", &json!({"amount": 10}))
        .await
        .unwrap();
    let resp = server
        .post("/session/load", &json!({"key": "session_1"}))
        .await
        .expect("Failed to load");
    assert_eq!(resp.status(), 200);

    let body: Value = server
        .get("/session/combatants/Rogue")
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["current_hp"], 22);

    // Unknown keys and invalid keys are reported, not invented
    let resp = server
        .post("/session/load", &json!({"key": "missing"}))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let resp = server
        .post("/session/save", &json!({"key": "../escape"}))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}
