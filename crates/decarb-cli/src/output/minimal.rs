use serde_json::Value;

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // Nested objects that hold the headline figure
    let nested = ["figures", "metrics", "summary", "stats"];
    let priority_keys = [
        "mac",
        "npv",
        "co2_reduction",
        "total_avoided",
        "final_remaining",
        "cumulative_delta",
        "net_cost",
    ];

    if let Value::Object(map) = result_obj {
        let scopes = std::iter::once(map).chain(
            nested
                .iter()
                .filter_map(|k| map.get(*k).and_then(Value::as_object)),
        );
        for scope in scopes {
            for key in &priority_keys {
                if let Some(val) = scope.get(*key) {
                    if !val.is_null() {
                        println!("{}", format_minimal(val));
                        return;
                    }
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
