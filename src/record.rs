use anyhow::{Context, Result, anyhow};
use serde_json::Value;

/// One game as it appears in the source document. Scores are kept raw so the
/// validity rule below is the single place that decides what counts as a
/// playable score; everything else is free text.
#[derive(Debug, Clone, Default)]
pub struct GameRecord {
    pub team_score: Value,
    pub opp_score: Value,
    pub date: String,
    pub opponent: String,
    pub result: String,
}

impl GameRecord {
    pub fn new(
        team_score: impl Into<Value>,
        opp_score: impl Into<Value>,
        date: &str,
        opponent: &str,
        result: &str,
    ) -> Self {
        Self {
            team_score: team_score.into(),
            opp_score: opp_score.into(),
            date: date.to_string(),
            opponent: opponent.to_string(),
            result: result.to_string(),
        }
    }

    /// `(low, high)` grid coordinate, present only when both scores pass
    /// [`parse_score`].
    pub fn score_pair(&self) -> Option<ScorePair> {
        let a = parse_score(&self.team_score)?;
        let b = parse_score(&self.opp_score)?;
        Some(ScorePair::new(a, b))
    }
}

/// A final result reduced to `(losing score, winning score)`, order
/// independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScorePair {
    pub low: u32,
    pub high: u32,
}

impl ScorePair {
    pub fn new(a: u32, b: u32) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }
}

/// The score-validity rule. A raw field is a usable score iff it converts to
/// a finite number, that number has no fractional part, and the text form
/// leads with a base-10 integer token (sign then digit). Surrounding
/// whitespace is tolerated, so `12`, `"12"`, `" 12 "` and `"12.0"` all pass
/// while `12.5`, `"12abc"`, `null` and `true` do not. Negative values are
/// rejected: grid coordinates are unsigned.
pub fn parse_score(raw: &Value) -> Option<u32> {
    let numeric = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if !leads_with_int_token(s) {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    if !numeric.is_finite() || numeric.trunc() != numeric {
        return None;
    }
    if numeric < 0.0 || numeric > f64::from(u32::MAX) {
        return None;
    }
    Some(numeric as u32)
}

fn leads_with_int_token(s: &str) -> bool {
    let rest = s.strip_prefix(['+', '-']).unwrap_or(s);
    rest.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Parses the source document: a top-level object whose `"games"` key maps
/// to either an object of records or an array of them. A document without a
/// usable `"games"` key is a hard error; no partial grid is built from it.
pub fn parse_games_json(raw: &str) -> Result<Vec<GameRecord>> {
    let doc = serde_json::from_str::<Value>(raw.trim()).context("invalid games json")?;
    let games = doc
        .get("games")
        .ok_or_else(|| anyhow!("document has no top-level \"games\" key"))?;

    let entries: Vec<&Value> = match games {
        Value::Object(map) => map.values().collect(),
        Value::Array(list) => list.iter().collect(),
        other => {
            return Err(anyhow!(
                "\"games\" must be an object or array, got {other}"
            ));
        }
    };

    Ok(entries.iter().map(|v| record_from_value(v)).collect())
}

fn record_from_value(v: &Value) -> GameRecord {
    GameRecord {
        team_score: v.get("NCSU Score").cloned().unwrap_or(Value::Null),
        opp_score: v.get("Opp Score").cloned().unwrap_or(Value::Null),
        date: field_str(v, "Date"),
        opponent: field_str(v, "Opponent"),
        result: field_str(v, "Result"),
    }
}

fn field_str(v: &Value, key: &str) -> String {
    v.get(key)
        .and_then(|x| x.as_str())
        .unwrap_or_default()
        .to_string()
}
