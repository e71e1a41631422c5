use rulepy::{translate, MappingType, Translator, TranslatorOptions};

fn fixture_lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

#[test]
fn case_a_if_any_with_else_matches_expected() {
    let src = include_str!("fixtures/if_any_else.rules");
    let expected = include_str!("fixtures/if_any_else.py");
    let out = translate(src);
    assert!(out.success, "{:?}", out.errors);
    assert_eq!(fixture_lines(&out.python_code), fixture_lines(expected));
}

#[test]
fn case_a_if_any_break_maps_to_header() {
    let src = include_str!("fixtures/if_any_else.rules");
    let map = translate(src).source_map.unwrap();
    let brk = map.business_line_for(4).unwrap();
    assert_eq!(brk.mapping_type, MappingType::BreakStatement);
    assert_eq!(brk.business_line, 1);
    assert_eq!(map.python_lines_for(3)[0].python_line, 5);
}

#[test]
fn case_b_nested_if_any_matches_expected() {
    let src = include_str!("fixtures/nested_if_any.rules");
    let expected = include_str!("fixtures/nested_if_any.py");
    let out = translate(src);
    assert!(out.success, "{:?}", out.errors);
    assert_eq!(fixture_lines(&out.python_code), fixture_lines(expected));

    let map = out.source_map.unwrap();
    assert_eq!(map.transformations.len(), 1);
    assert_eq!(map.transformations[0].business_line_range, (2, 8));
    assert_eq!(map.business_line_for(4).unwrap().business_line, 3);
    assert_eq!(map.business_line_for(7).unwrap().mapping_type, MappingType::BreakStatement);
}

#[test]
fn case_b_nested_if_any_respects_depth_limit() {
    let src = include_str!("fixtures/nested_if_any.rules");
    let translator = Translator::new(TranslatorOptions {
        max_nesting_depth: 1,
        ..TranslatorOptions::default()
    });
    let out = translator.translate(src);
    assert!(!out.success);
    assert!(out.errors.iter().any(|e| e.starts_with("Line 2: nesting depth")));
    assert!(out.python_code.contains("# ERROR: if any school in district.schools"));
}

#[test]
fn case_c_brace_style_blocks() {
    let src = include_str!("fixtures/brace_style.rules");
    let out = translate(src);
    assert!(out.success, "{:?}", out.errors);
    let lines = fixture_lines(&out.python_code);
    // the two closing braces leave blank lines behind
    assert_eq!(out.python_code.split('\n').count(), 9);
    assert_eq!(
        lines[..7],
        [
            "class Premium(Customer):",
            "  if points > 1000 or vip:",
            "    tier = \"gold\"",
            "  elif points > 500:",
            "    tier = \"silver\"",
            "  else:",
            "    tier = \"bronze\"",
        ]
    );
    assert!(!out.python_code.contains('{'));
    assert!(!out.python_code.contains('}'));
}

#[test]
fn case_d_line_errors_keep_the_rest() {
    let src = include_str!("fixtures/line_errors.rules");
    let out = translate(src);
    assert!(!out.success);
    assert_eq!(out.errors.len(), 1);
    assert!(out.errors[0].starts_with("Line 2: malformed `if any` statement"));
    assert!(out.warnings.iter().any(|w| w.starts_with("Line 5:")));

    assert_eq!(
        fixture_lines(&out.python_code),
        [
            "total = len(order.lines)",
            "# ERROR: if any x has 4",
            "  bad = 1",
            "discount = round(total, 2)",
            "due = order.date.addDays()",
        ]
    );
    let map = out.source_map.unwrap();
    assert_eq!(map.business_line_for(2).unwrap().mapping_type, MappingType::ExceptionHandler);
    assert_eq!(map.business_line_for(5).unwrap().business_line, 5);
}

#[test]
fn case_e_shipping_rules_end_to_end() {
    let src = include_str!("fixtures/shipping.rules");
    let out = translate(src);
    assert!(out.success, "{:?}", out.errors);
    assert!(out.python_code.starts_with("import datetime\nimport rule_helpers\n\n# Shipping rules\n"));
    assert!(out.python_code.contains("today = datetime.datetime.now()"));
    assert!(out.python_code.contains("for item in cart.items:  # heavy goods\n    if item.weight > 20:\n"));
    assert!(out.python_code.contains("        note = rule_helpers.log_message(\"heavy item\")\n        break\n"));
    assert!(out.python_code.contains("else:\n    surcharge = 0\n"));
    assert!(out.python_code.contains("if surcharge == 0 and not express:"));
    assert!(out.python_code.contains("elif express:\n  eta = today + datetime.timedelta(days=1)"));
    assert!(out.python_code.ends_with("else:\n  eta = today + datetime.timedelta(days=3)"));

    let map = out.source_map.unwrap();
    // three import lines, then the comment on business line 1
    assert_eq!(map.business_line_for(4).unwrap().business_line, 1);
    assert!(map.business_line_for(1).is_none());
    assert_eq!(map.business_line_for(6).unwrap().mapping_type, MappingType::LoopHeader);
}

#[test]
fn case_e_shipping_rules_without_comments() {
    let src = include_str!("fixtures/shipping.rules");
    let translator = Translator::new(TranslatorOptions {
        generate_comments: false,
        ..TranslatorOptions::default()
    });
    let out = translator.translate(src);
    assert!(out.success);
    assert!(!out.python_code.contains('#'));
    assert_eq!(out.python_code.lines().count(), translate(src).python_code.lines().count());
}
