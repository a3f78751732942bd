//! Property-based tests for command sending and eligibility

use proptest::prelude::*;
use termdeck::models::{Configuration, TerminalDefinition, Trigger};
use termdeck::runner::send_plan;

fn terminal_strategy() -> impl Strategy<Value = TerminalDefinition> {
    (
        "[a-z]{1,8}",
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(name, only_api, only_single, only_multiple)| {
            let mut terminal = TerminalDefinition::new(name, "ls");
            terminal.only_api = only_api;
            terminal.only_single = only_single;
            terminal.only_multiple = only_multiple;
            terminal
        })
}

proptest! {
    #[test]
    fn test_send_plan_keeps_commands_in_order(
        commands in prop::collection::vec("[a-z ]{0,12}", 1..8),
        execute in any::<bool>(),
    ) {
        let plan = send_plan(commands.clone(), execute);
        let texts: Vec<String> = plan.iter().map(|input| input.text.clone()).collect();
        prop_assert_eq!(texts, commands);
    }

    #[test]
    fn test_send_plan_holds_back_at_most_the_last(
        commands in prop::collection::vec("[a-z]{1,12}", 1..8),
        execute in any::<bool>(),
    ) {
        let plan = send_plan(commands, execute);
        let (last, rest) = plan.split_last().unwrap();
        prop_assert!(rest.iter().all(|input| input.submit));
        prop_assert_eq!(last.submit, execute);
    }

    #[test]
    fn test_eligibility_matches_flags(
        terminals in prop::collection::vec(terminal_strategy(), 0..12),
    ) {
        let mut config = Configuration::empty("terminals.json".into());
        config.terminals = terminals.clone();

        let batch = config.eligible(Trigger::Batch);
        let expected = terminals
            .iter()
            .filter(|t| !t.only_api && !t.only_single)
            .count();
        prop_assert_eq!(batch.len(), expected);
        prop_assert!(batch.iter().all(|t| !t.only_api && !t.only_single));

        let pick = config.eligible(Trigger::SinglePick);
        prop_assert!(pick.iter().all(|t| !t.only_api && !t.only_multiple));
    }

    #[test]
    fn test_group_names_are_distinct(
        groups in prop::collection::vec(prop::option::of("[a-c]"), 0..12),
    ) {
        let mut config = Configuration::empty("terminals.json".into());
        config.terminals = groups
            .iter()
            .enumerate()
            .map(|(index, group)| {
                let mut terminal = TerminalDefinition::new(format!("t{}", index), "ls");
                terminal.group = group.clone();
                terminal
            })
            .collect();

        let names = config.group_names();
        let mut deduped = names.clone();
        deduped.sort();
        deduped.dedup();
        prop_assert_eq!(names.len(), deduped.len());

        let members: usize = names.iter().map(|name| config.group_members(name).len()).sum();
        prop_assert_eq!(members, groups.iter().filter(|g| g.is_some()).count());
    }
}
