// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn id_arg(required: bool) -> Arg {
    let a = Arg::new("id").long("id").help("Entity id");
    if required { a.required(true) } else { a.help("Entity id (generated when omitted)") }
}

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .help("Month as YYYY-MM (defaults to the current month)")
}

// Shared between `tx add` and `tx update`. An empty string clears a link.
fn tx_field_args(cmd: Command, for_update: bool) -> Command {
    let type_arg = Arg::new("type")
        .long("type")
        .value_parser(["expense", "income", "transfer"])
        .help("Transaction type");
    let amount_arg = Arg::new("amount").long("amount").help("Amount (non-negative)");
    let (type_arg, amount_arg) = if for_update {
        (type_arg, amount_arg)
    } else {
        (type_arg.required(true), amount_arg.required(true))
    };
    cmd.arg(type_arg)
        .arg(amount_arg)
        .arg(
            Arg::new("status")
                .long("status")
                .value_parser(["completed", "cancelled", "pending"])
                .help("Status"),
        )
        .arg(Arg::new("date").long("date").help("Date as YYYY-MM-DD"))
        .arg(Arg::new("description").long("description").help("Free-text description"))
        .arg(Arg::new("account").long("account").help("Account id"))
        .arg(Arg::new("category").long("category").help("Category id"))
        .arg(
            Arg::new("to-account")
                .long("to-account")
                .help("Destination account id (transfers)"),
        )
        .arg(Arg::new("card").long("card").help("Credit card id"))
}

pub fn build_cli() -> Command {
    Command::new("finora")
        .about("Personal finance ledger: accounts, cards, goals and monthly reports")
        .version(clap::crate_version!())
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .help("Owner id to scope data by (overrides FINORA_USER)"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(id_arg(false)),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("rename")
                        .arg(id_arg(true))
                        .arg(Arg::new("name").long("name").required(true)),
                )
                .subcommand(Command::new("rm").arg(id_arg(true))),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("icon").long("icon"))
                        .arg(id_arg(false)),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(Command::new("rm").arg(id_arg(true))),
        )
        .subcommand(
            Command::new("card")
                .about("Manage credit cards")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("limit").long("limit").required(true))
                        .arg(
                            Arg::new("due-day")
                                .long("due-day")
                                .required(true)
                                .value_parser(value_parser!(u32)),
                        )
                        .arg(Arg::new("icon").long("icon"))
                        .arg(Arg::new("color").long("color"))
                        .arg(id_arg(false)),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("recompute")
                        .about("Recompute used amounts from transactions")
                        .arg(Arg::new("id").long("id").help("Only this card")),
                )
                .subcommand(json_flags(
                    Command::new("bill")
                        .about("Charges minus credits for one month")
                        .arg(id_arg(true))
                        .arg(month_arg()),
                ))
                .subcommand(Command::new("rm").arg(id_arg(true))),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and edit transactions")
                .subcommand(tx_field_args(Command::new("add").arg(id_arg(false)), false))
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(month_arg())
                        .arg(Arg::new("account").long("account"))
                        .arg(Arg::new("card").long("card"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(tx_field_args(
                    Command::new("update")
                        .arg(id_arg(true))
                        .arg(
                            Arg::new("patch")
                                .long("patch")
                                .help("JSON object with camelCase fields, e.g. {\"accountId\":\"acc2\"}"),
                        ),
                    true,
                ))
                .subcommand(Command::new("rm").arg(id_arg(true))),
        )
        .subcommand(
            Command::new("report")
                .about("Monthly reports")
                .subcommand(json_flags(Command::new("month").arg(month_arg())))
                .subcommand(json_flags(Command::new("categories").arg(month_arg()))),
        )
        .subcommand(
            Command::new("goal")
                .about("Savings goals")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("target").long("target").required(true))
                        .arg(Arg::new("current").long("current"))
                        .arg(
                            Arg::new("timeframe")
                                .long("timeframe")
                                .required(true)
                                .value_parser(["short", "medium", "long"]),
                        )
                        .arg(Arg::new("icon").long("icon"))
                        .arg(id_arg(false)),
                )
                .subcommand(json_flags(Command::new("list").arg(month_arg())))
                .subcommand(
                    Command::new("contribute")
                        .arg(id_arg(true))
                        .arg(Arg::new("amount").long("amount").required(true)),
                )
                .subcommand(Command::new("rm").arg(id_arg(true))),
        )
        .subcommand(
            Command::new("salary")
                .about("Monthly salary used for the debt ratio")
                .subcommand(
                    Command::new("set").arg(Arg::new("amount").long("amount").required(true)),
                )
                .subcommand(Command::new("show")),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("transactions")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .required(true)
                            .value_parser(["csv", "json"]),
                    )
                    .arg(Arg::new("out").long("out").required(true))
                    .arg(month_arg()),
            ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        build_cli().debug_assert();
    }

    #[test]
    fn update_accepts_empty_link_values() {
        let m = build_cli()
            .try_get_matches_from(["finora", "tx", "update", "--id", "t1", "--card", ""])
            .unwrap();
        let (_, tx) = m.subcommand().unwrap();
        let (_, upd) = tx.subcommand().unwrap();
        assert_eq!(upd.get_one::<String>("card").map(String::as_str), Some(""));
    }

    #[test]
    fn card_bill_takes_a_month() {
        let m = build_cli()
            .try_get_matches_from(["finora", "card", "bill", "--id", "card1", "--month", "2025-04"])
            .unwrap();
        let (_, card) = m.subcommand().unwrap();
        let (name, bill) = card.subcommand().unwrap();
        assert_eq!(name, "bill");
        assert_eq!(bill.get_one::<String>("month").map(String::as_str), Some("2025-04"));
        assert!(build_cli()
            .try_get_matches_from(["finora", "card", "bill"])
            .is_err());
    }

    #[test]
    fn export_rejects_unknown_format() {
        let r = build_cli().try_get_matches_from([
            "finora", "export", "transactions", "--format", "xml", "--out", "x",
        ]);
        assert!(r.is_err());
    }
}
