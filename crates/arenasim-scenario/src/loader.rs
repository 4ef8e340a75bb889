//! Scenario parsing and validation
//! failure: abort load, return structured error; no partial world is
//! exposed." `load` either returns a fully validated `ScenarioFile` or
//! an error; it never hands back a half-built one.

use arenasim_core::error::{SimError, SimResult};

use crate::schema::ScenarioFile;

pub fn load(json: &str) -> SimResult<ScenarioFile> {
    let scenario: ScenarioFile =
        serde_json::from_str(json).map_err(|e| SimError::ScenarioParse(e.to_string()))?;
    validate(&scenario)?;
    Ok(scenario)
}

fn validate(scenario: &ScenarioFile) -> SimResult<()> {
    let mut seen_ids = std::collections::HashSet::new();
    for entity in &scenario.entities {
        if !seen_ids.insert(entity.id.clone()) {
            return Err(SimError::ScenarioParse(format!("duplicate entity id: {}", entity.id)));
        }
        if entity.physics_component_count() != 1 {
            return Err(SimError::ScenarioParse(format!(
                "entity {} must have exactly one physics component, found {}",
                entity.id,
                entity.physics_component_count()
            )));
        }
        if entity.ai_component_count() > 1 {
            return Err(SimError::ScenarioParse(format!(
                "entity {} has more than one AI component",
                entity.id
            )));
        }
    }
    for event in &scenario.events {
        if event.time < 0.0 {
            return Err(SimError::ScenarioParse(format!(
                "event {} has negative time {}",
                event.action, event.time
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_entity_json(id: &str) -> String {
        format!(
            r#"{{"id": "{id}", "name": "n", "type": "aircraft", "team": "blue",
                "components": [{{"type": "atmospheric_3dof", "lat": 0.1, "lon": 0.2,
                "alt": 5000.0, "speed": 200.0, "heading": 1.0}}]}}"#
        )
    }

    #[test]
    fn well_formed_scenario_parses() {
        let json = format!(
            r#"{{"metadata": {{"name": "s"}}, "entities": [{}]}}"#,
            minimal_entity_json("e-1")
        );
        let scenario = load(&json).unwrap();
        assert_eq!(scenario.entities.len(), 1);
    }

    #[test]
    fn duplicate_entity_id_is_rejected() {
        let json = format!(
            r#"{{"metadata": {{"name": "s"}}, "entities": [{}, {}]}}"#,
            minimal_entity_json("e-1"),
            minimal_entity_json("e-1")
        );
        assert!(load(&json).is_err());
    }

    #[test]
    fn entity_missing_physics_component_is_rejected() {
        let json = r#"{"metadata": {"name": "s"},
            "entities": [{"id": "e-1", "name": "n", "type": "aircraft", "team": "blue", "components": []}]}"#;
        assert!(load(json).is_err());
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(load("{ not json").is_err());
    }
}
