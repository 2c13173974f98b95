//! Convert the contents of a plan file into a validated `Plan`

#![allow(clippy::upper_case_acronyms)]

use pest::Parser;
use pest_derive::*;
type Pair<'i> = pest::iterators::Pair<'i, Rule>;
type Pairs<'i> = pest::iterators::Pairs<'i, Rule>;

use crate::lib::{
    budget::MonthBudget,
    date::{Date, Month},
    error::{Error, Loc, Record},
    plan::{self, Plan, Window},
};

#[derive(Parser)]
#[grammar = "plan.pest"]
struct PlanParser;

/// Get the plan described by `contents`, read from file `path`
///
/// Returns `None` if any fatal error was recorded in `errs`. Warnings are
/// recorded as well, caller should print `errs` in both cases.
pub fn extract<'i>(path: &'i str, errs: &mut Record, contents: &'i str) -> Option<Plan> {
    let contents = match PlanParser::parse(Rule::program, contents) {
        Ok(contents) => contents,
        Err(e) => {
            Error::new("Parsing failure")
                .with_error(e.with_path(path))
                .register(errs);
            return None;
        }
    };
    validate(path, errs, contents)
}

// extract contents of wrapper rule
macro_rules! subrule {
    ( $node:expr ) => {{
        let mut items = $node.into_inner();
        let fst = items.next().unwrap_or_else(|| panic!("No subrule"));
        if items.next().is_some() {
            panic!("Several subrules");
        }
        fst
    }};
}

// get first and rest of inner
macro_rules! decapitate {
    ( $node:expr ) => {{
        let mut items = $node.into_inner();
        let fst = items.next().unwrap_or_else(|| panic!("No head"));
        (fst, items)
    }};
}

// extract two-element inner
macro_rules! pair {
    ( $node:expr ) => {{
        let mut items = $node.into_inner();
        let fst = items.next().unwrap_or_else(|| panic!("No 1st"));
        let snd = items.next().unwrap_or_else(|| panic!("No 2nd"));
        assert!(items.next().is_none());
        (fst, snd)
    }};
}

// extract three-element inner
macro_rules! triplet {
    ( $node:expr ) => {{
        let mut items = $node.into_inner();
        let fst = items.next().unwrap_or_else(|| panic!("No 1st"));
        let snd = items.next().unwrap_or_else(|| panic!("No 2nd"));
        let thr = items.next().unwrap_or_else(|| panic!("No 3rd"));
        assert!(items.next().is_none());
        (fst, snd, thr)
    }};
}

// pair to usize contents
macro_rules! parse_usize {
    ( $node:expr ) => {
        // safe to .unwrap() because the grammar validated it already
        $node.as_str().parse::<usize>().unwrap()
    };
}

// pair to quantity contents
macro_rules! parse_quantity {
    ( $node:expr ) => {
        // safe to .unwrap() because the grammar validated it already
        $node.as_str().parse::<f64>().unwrap()
    };
}

// set-once value, the first definition is kept
macro_rules! set_or_fail {
    ( $errs:expr, $var:expr, $val:expr, $name:expr, $loc:expr ) => {{
        if $var.is_some() {
            Error::new("Duplicate field definition")
                .with_span(&$loc, format!("attempt to override {}", $name))
                .with_text("Each field may only be defined once")
                .with_hint("remove one of the field definitions")
                .register($errs);
        } else {
            $var = Some($val);
        }
    }};
}

// non-optional value
macro_rules! unwrap_or_fail {
    ( $errs:expr, $path:expr, $val:expr, $name:expr ) => {{
        match $val {
            Some(v) => Some(v),
            None => {
                let name = $name;
                let hint_value = match name {
                    "workspace" => "\"My Workspace\";",
                    "project" => "\"My Project\";",
                    "window" => "2023-Dec-01 .. 2024-Nov-30;",
                    _ => unreachable!(),
                };
                Error::new("Missing field definition")
                    .with_text(format!("'{}' may not be omitted from '{}'", name, $path))
                    .with_hint(format!(
                        "add definition for the missing field: '{} {}'",
                        name, hint_value
                    ))
                    .register($errs);
                None
            }
        }
    }};
}

pub fn validate<'i>(path: &'i str, errs: &mut Record, pairs: Pairs<'i>) -> Option<Plan> {
    let mut workspace: Option<String> = None;
    let mut project: Option<String> = None;
    let mut title: Option<String> = None;
    let mut window: Option<Window> = None;
    let mut workday: Option<f64> = None;
    let mut page_size: Option<usize> = None;
    let mut purchases: Vec<(Loc<'i>, MonthBudget)> = Vec::new();
    for pair in pairs {
        match pair.as_rule() {
            Rule::field => {
                let field = subrule!(pair);
                let loc = (path, field.as_span());
                match field.as_rule() {
                    Rule::field_workspace => {
                        set_or_fail!(errs, workspace, read_text(subrule!(field)), "workspace", loc);
                    }
                    Rule::field_project => {
                        set_or_fail!(errs, project, read_text(subrule!(field)), "project", loc);
                    }
                    Rule::field_title => {
                        set_or_fail!(errs, title, read_text(subrule!(field)), "title", loc);
                    }
                    Rule::field_window => {
                        if let Some(w) = validate_window(path, errs, field) {
                            set_or_fail!(errs, window, w, "window", loc);
                        }
                    }
                    Rule::field_workday => {
                        if let Some(hours) = validate_workday(&loc, errs, subrule!(field)) {
                            set_or_fail!(errs, workday, hours, "workday", loc);
                        }
                    }
                    Rule::field_pagesize => {
                        if let Some(size) = validate_page_size(&loc, errs, subrule!(field)) {
                            set_or_fail!(errs, page_size, size, "pagesize", loc);
                        }
                    }
                    _ => unreachable!(),
                }
            }
            Rule::purchases_year => {
                let (head, body) = decapitate!(pair);
                assert_eq!(head.as_rule(), Rule::marker_year);
                let year = parse_usize!(head);
                for purchase in body {
                    if let Some(item) = validate_purchase(path, errs, year, purchase) {
                        purchases.push(item);
                    }
                }
            }
            Rule::EOI => break,
            _ => unreachable!(),
        }
    }
    check_chronology(errs, &purchases);
    if purchases.is_empty() {
        Error::new("No purchased days")
            .nonfatal()
            .with_text(format!("'{}' does not list any month of purchased days", path))
            .with_text("The budget line will not be drawn")
            .with_hint("add purchases grouped by year, e.g. '2024: Jan: 5;'")
            .register(errs);
    }
    let workspace = unwrap_or_fail!(errs, path, workspace, "workspace");
    let project = unwrap_or_fail!(errs, path, project, "project");
    let window = unwrap_or_fail!(errs, path, window, "window");
    if errs.is_fatal() {
        return None;
    }
    Some(Plan {
        workspace: workspace?,
        project: project?,
        title: title.unwrap_or_else(|| plan::DEFAULT_TITLE.to_string()),
        window: window?,
        workday: workday.unwrap_or(plan::DEFAULT_WORKDAY),
        page_size: page_size.unwrap_or(plan::DEFAULT_PAGE_SIZE),
        months: purchases.into_iter().map(|(_, m)| m).collect(),
    })
}

fn read_text(pair: Pair) -> String {
    assert_eq!(pair.as_rule(), Rule::tag_text);
    subrule!(pair).as_str().to_string()
}

fn validate_date(path: &str, errs: &mut Record, pair: Pair) -> Option<Date> {
    assert_eq!(pair.as_rule(), Rule::date);
    let loc = (path, pair.as_span());
    let (year, month, day) = triplet!(pair);
    let month = Month::from(month.as_str());
    // the grammar bounds the year but not the day
    let day = match day.as_str().parse::<usize>() {
        Ok(day) => day,
        Err(_) => {
            Error::new("Invalid date")
                .with_span(&loc, "defined here")
                .with_text(format!("'{}' is not a day of the month", day.as_str()))
                .with_hint("days range from 1 to 31")
                .register(errs);
            return None;
        }
    };
    validated(&loc, errs, Date::from(parse_usize!(year), month, day))
}

fn validated(loc: &Loc, errs: &mut Record, date: Result<Date, crate::lib::date::DateError>) -> Option<Date> {
    match date {
        Ok(date) => Some(date),
        Err(e) => {
            Error::new("Invalid date")
                .with_span(loc, "defined here")
                .with_text(format!("{}", e))
                .with_hint("choose a date that exists")
                .with_hint(e.fix_hint())
                .register(errs);
            None
        }
    }
}

fn validate_window(path: &str, errs: &mut Record, pair: Pair) -> Option<Window> {
    let loc = (path, pair.as_span());
    let (first, last) = pair!(pair);
    let first = validate_date(path, errs, first);
    let last = validate_date(path, errs, last);
    let (first, last) = (first?, last?);
    if first > last {
        Error::new("Empty window")
            .with_span(&loc, "defined here")
            .with_text(format!("{} is after {}", first, last))
            .with_hint("swap the two dates")
            .register(errs);
        return None;
    }
    Some(Window { first, last })
}

fn validate_workday(loc: &Loc, errs: &mut Record, pair: Pair) -> Option<f64> {
    assert_eq!(pair.as_rule(), Rule::quantity);
    let hours = parse_quantity!(pair);
    if hours <= 0.0 {
        Error::new("Invalid work day")
            .with_span(loc, "defined here")
            .with_text(format!("a work day of {} hours is not usable", hours))
            .with_hint("hours per work day must be positive")
            .register(errs);
        return None;
    }
    Some(hours)
}

fn validate_page_size(loc: &Loc, errs: &mut Record, pair: Pair) -> Option<usize> {
    assert_eq!(pair.as_rule(), Rule::number);
    match pair.as_str().parse::<usize>() {
        Ok(size) if (1..=plan::MAX_PAGE_SIZE).contains(&size) => Some(size),
        _ => {
            Error::new("Invalid page size")
                .with_span(loc, "defined here")
                .with_text(format!("the report API accepts 1 to {} entries per page", plan::MAX_PAGE_SIZE))
                .with_hint(format!("use 'pagesize {};'", plan::DEFAULT_PAGE_SIZE))
                .register(errs);
            None
        }
    }
}

fn validate_purchase<'i>(
    path: &'i str,
    errs: &mut Record,
    year: usize,
    pair: Pair<'i>,
) -> Option<(Loc<'i>, MonthBudget)> {
    assert_eq!(pair.as_rule(), Rule::purchase);
    let loc = (path, pair.as_span());
    let (month, days) = pair!(pair);
    let month = validated(&loc, errs, Date::from(year, Month::from(month.as_str()), 1))?;
    let days = parse_quantity!(days);
    if days < 0.0 {
        Error::new("Negative purchase")
            .nonfatal()
            .with_span(&loc, "defined here")
            .with_text(format!("{} days purchased in {}-{}", days, month.year(), month.month()))
            .with_hint("the budget line will decrease over this month")
            .register(errs);
    }
    Some((loc, MonthBudget { month, days }))
}

fn check_chronology(errs: &mut Record, purchases: &[(Loc, MonthBudget)]) {
    for w in purchases.windows(2) {
        let ((prev_loc, prev), (loc, curr)) = (&w[0], &w[1]);
        if curr.month == prev.month {
            Error::new("Duplicate month")
                .with_span(loc, "attempt to redefine this month")
                .with_span(prev_loc, "already defined here")
                .with_text(format!("{}-{} may only be listed once", curr.month.year(), curr.month.month()))
                .with_hint("add up the days of both lines")
                .register(errs);
        } else if curr.month < prev.month {
            Error::new("Months out of order")
                .with_span(loc, "this month")
                .with_span(prev_loc, "comes before this one")
                .with_text("Purchases must be listed chronologically")
                .with_hint("move the purchase to its year, in calendar order")
                .register(errs);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::date::Month::*;
    use pretty_assertions::assert_eq;

    const REFERENCE: &str = r#"
// DevOps support contract
workspace "Hexiosec";
project "DevOps Support 23/24 - RMSOW23058";
title "DLP Hours Used";
window 2023-Dec-01 .. 2024-Nov-30;
workday 8;

2023:
    Dec: 7;
2024:
    Jan: 7; Feb: 7; Mar: 6;
    Apr: 5; May: 5; Jun: 5; Jul: 5;
    Aug: 5; Sep: 5; Oct: 5; Nov: 5;
"#;

    fn date(year: usize, month: Month, day: usize) -> Date {
        Date::from(year, month, day).unwrap()
    }

    fn load(contents: &str) -> (Option<Plan>, Record) {
        let mut errs = Record::new();
        let plan = extract("test.pln", &mut errs, contents);
        (plan, errs)
    }

    macro_rules! fails {
        ( $contents:expr, $label:expr ) => {{
            let (plan, errs) = load($contents);
            assert!(plan.is_none());
            assert!(errs.is_fatal());
            let shown = errs.to_string();
            assert!(shown.contains($label), "expected '{}' in:\n{}", $label, shown);
        }};
    }

    #[test]
    fn reference_plan() {
        let (plan, errs) = load(REFERENCE);
        assert!(!errs.is_fatal());
        assert_eq!(errs.count_warnings(), 0);
        let plan = plan.unwrap();
        assert_eq!(plan.workspace, "Hexiosec");
        assert_eq!(plan.project, "DevOps Support 23/24 - RMSOW23058");
        assert_eq!(plan.title, "DLP Hours Used");
        assert_eq!(plan.window, Window { first: date(2023, Dec, 1), last: date(2024, Nov, 30) });
        assert_eq!(plan.workday, 8.0);
        assert_eq!(plan.page_size, 1000);
        assert_eq!(plan.months.len(), 12);
        assert_eq!(plan.months[0], MonthBudget { month: date(2023, Dec, 1), days: 7.0 });
        assert_eq!(plan.months[3], MonthBudget { month: date(2024, Mar, 1), days: 6.0 });
        assert_eq!(plan.purchased_hours(), 536.0);
    }

    #[test]
    fn defaults() {
        let (plan, errs) = load(
            r#"workspace "W"; project "P"; window 2024-Jan-01 .. 2024-Jan-31; 2024: Jan: 2.5;"#,
        );
        assert!(!errs.is_fatal());
        let plan = plan.unwrap();
        assert_eq!(plan.title, "Hours Used");
        assert_eq!(plan.workday, 8.0);
        assert_eq!(plan.page_size, 1000);
        assert_eq!(plan.months, vec![MonthBudget { month: date(2024, Jan, 1), days: 2.5 }]);
    }

    #[test]
    fn syntax_error() {
        fails!(r#"workspace Hexiosec;"#, "Parsing failure");
    }

    #[test]
    fn missing_project() {
        fails!(r#"workspace "W"; window 2024-Jan-01 .. 2024-Jan-31;"#, "Missing field definition");
    }

    #[test]
    fn duplicate_field() {
        fails!(
            r#"workspace "W"; workspace "X"; project "P"; window 2024-Jan-01 .. 2024-Jan-31;"#,
            "Duplicate field definition"
        );
    }

    #[test]
    fn nonexistent_date() {
        fails!(
            r#"workspace "W"; project "P"; window 2023-Feb-29 .. 2024-Jan-31;"#,
            "Invalid date"
        );
    }

    #[test]
    fn overlong_day() {
        fails!(
            r#"workspace "W"; project "P"; window 2024-Jan-99999999999999999999999 .. 2024-Jan-31;"#,
            "Invalid date"
        );
    }

    #[test]
    fn reversed_window() {
        fails!(
            r#"workspace "W"; project "P"; window 2024-Jan-31 .. 2024-Jan-01;"#,
            "Empty window"
        );
    }

    #[test]
    fn bad_page_size() {
        fails!(
            r#"workspace "W"; project "P"; window 2024-Jan-01 .. 2024-Jan-31; pagesize 5000;"#,
            "Invalid page size"
        );
        fails!(
            r#"workspace "W"; project "P"; window 2024-Jan-01 .. 2024-Jan-31; pagesize 0;"#,
            "Invalid page size"
        );
    }

    #[test]
    fn bad_workday() {
        fails!(
            r#"workspace "W"; project "P"; window 2024-Jan-01 .. 2024-Jan-31; workday 0;"#,
            "Invalid work day"
        );
    }

    #[test]
    fn months_out_of_order() {
        fails!(
            r#"workspace "W"; project "P"; window 2024-Jan-01 .. 2024-Dec-31;
            2024: Mar: 6; Jan: 7;"#,
            "Months out of order"
        );
        fails!(
            r#"workspace "W"; project "P"; window 2024-Jan-01 .. 2024-Dec-31;
            2024: Jan: 6; 2024: Jan: 7;"#,
            "Duplicate month"
        );
    }

    #[test]
    fn negative_purchase_warns() {
        let (plan, errs) = load(
            r#"workspace "W"; project "P"; window 2024-Jan-01 .. 2024-Feb-29;
            2024: Jan: 5; Feb: -1;"#,
        );
        assert!(!errs.is_fatal());
        assert_eq!(errs.count_warnings(), 1);
        assert!(errs.to_string().contains("Negative purchase"));
        assert_eq!(plan.unwrap().months[1].days, -1.0);
    }

    #[test]
    fn no_purchases_warns() {
        let (plan, errs) = load(r#"workspace "W"; project "P"; window 2024-Jan-01 .. 2024-Feb-29;"#);
        assert!(!errs.is_fatal());
        assert!(errs.to_string().contains("No purchased days"));
        assert!(plan.unwrap().months.is_empty());
    }
}
