//! Request bodies and result shaping for the search endpoints

use serde_json::{json, Value as JsonValue};

/// Dataview DQL selecting files modified in the trailing `days`, newest first
pub fn recent_changes_query(limit: i64, days: i64) -> String {
    [
        "TABLE file.mtime".to_string(),
        format!("WHERE file.mtime >= date(today) - dur({} days)", days),
        "SORT file.mtime DESC".to_string(),
        format!("LIMIT {}", limit),
    ]
    .join("\n")
}

/// Reshape simple-search hits into `{filename, score, matches[{context, match_position}]}`
pub fn format_search_results(results: JsonValue) -> JsonValue {
    let hits = match results {
        JsonValue::Array(hits) => hits,
        other => return other,
    };

    let formatted = hits
        .iter()
        .map(|hit| {
            let matches: Vec<JsonValue> = hit
                .get("matches")
                .and_then(JsonValue::as_array)
                .map(|matches| {
                    matches
                        .iter()
                        .map(|m| {
                            let position = m.get("match");
                            json!({
                                "context": m.get("context").and_then(JsonValue::as_str).unwrap_or(""),
                                "match_position": {
                                    "start": position.and_then(|p| p.get("start")).and_then(JsonValue::as_i64).unwrap_or(0),
                                    "end": position.and_then(|p| p.get("end")).and_then(JsonValue::as_i64).unwrap_or(0),
                                }
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();

            json!({
                "filename": hit.get("filename").and_then(JsonValue::as_str).unwrap_or(""),
                "score": hit.get("score").cloned().unwrap_or(json!(0)),
                "matches": matches,
            })
        })
        .collect();

    JsonValue::Array(formatted)
}

/// One section of a batch read
pub fn batch_section(filepath: &str, content: &str) -> String {
    format!("# {}\n\n{}\n\n---\n\n", filepath, content)
}

/// Section reporting a file that could not be read
pub fn batch_error_section(filepath: &str, error: &impl std::fmt::Display) -> String {
    format!("# {}\n\nError reading file: {}\n\n---\n\n", filepath, error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_changes_query() {
        assert_eq!(
            recent_changes_query(5, 30),
            "TABLE file.mtime\n\
             WHERE file.mtime >= date(today) - dur(30 days)\n\
             SORT file.mtime DESC\n\
             LIMIT 5"
        );
    }

    #[test]
    fn test_format_search_results() {
        let raw = json!([
            {
                "filename": "notes/rust.md",
                "score": 1.5,
                "matches": [
                    {"context": "learning rust today", "match": {"start": 9, "end": 13}}
                ]
            },
            {"filename": "empty.md"}
        ]);

        let formatted = format_search_results(raw);
        assert_eq!(formatted[0]["filename"], "notes/rust.md");
        assert_eq!(formatted[0]["score"], 1.5);
        assert_eq!(formatted[0]["matches"][0]["context"], "learning rust today");
        assert_eq!(formatted[0]["matches"][0]["match_position"]["start"], 9);
        assert_eq!(formatted[0]["matches"][0]["match_position"]["end"], 13);
        assert_eq!(formatted[1]["matches"], json!([]));
        assert_eq!(formatted[1]["score"], 0);
    }

    #[test]
    fn test_non_array_search_results_untouched() {
        let raw = json!({"unexpected": true});
        assert_eq!(format_search_results(raw.clone()), raw);
    }

    #[test]
    fn test_batch_sections() {
        assert_eq!(batch_section("a.md", "hello"), "# a.md\n\nhello\n\n---\n\n");
        assert_eq!(
            batch_error_section("b.md", &"Error 40401: not found"),
            "# b.md\n\nError reading file: Error 40401: not found\n\n---\n\n"
        );
    }
}
