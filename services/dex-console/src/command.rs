use anyhow::bail;
use dex_api_types::{OperationKind, SwapDirection};

pub(crate) const HELP: &str = "\
commands:
  connect | disconnect | refresh | status
  swap a|b AMOUNT          swap Token A for B (a) or Token B for A (b)
  add AMOUNT_A AMOUNT_B    add liquidity
  remove AMOUNT_A AMOUNT_B remove liquidity
  price TOKEN_ADDRESS      look up a token price
  check TOKEN_ADDRESS      validate an address without querying
  clear-price
  last swap-a|swap-b|add|remove
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Connect,
    Disconnect,
    Refresh,
    Status,
    Swap {
        direction: SwapDirection,
        amount: String,
    },
    AddLiquidity {
        amount_a: String,
        amount_b: String,
    },
    RemoveLiquidity {
        amount_a: String,
        amount_b: String,
    },
    Price(String),
    CheckAddress(String),
    ClearPrice,
    Last(OperationKind),
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `None`.
pub(crate) fn parse(line: &str) -> anyhow::Result<Option<Command>> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&verb, args)) = words.split_first() else {
        return Ok(None);
    };

    // Amounts and addresses are passed through untouched; the session validates them.
    let command = match (verb.to_ascii_lowercase().as_str(), args) {
        ("connect", []) => Command::Connect,
        ("disconnect", []) => Command::Disconnect,
        ("refresh", []) => Command::Refresh,
        ("status", []) => Command::Status,
        ("swap", [side, amount]) => Command::Swap {
            direction: match side.to_ascii_lowercase().as_str() {
                "a" => SwapDirection::AforB,
                "b" => SwapDirection::BforA,
                other => bail!("unknown swap side `{other}`, expected a or b"),
            },
            amount: (*amount).to_owned(),
        },
        ("add", [amount_a, amount_b]) => Command::AddLiquidity {
            amount_a: (*amount_a).to_owned(),
            amount_b: (*amount_b).to_owned(),
        },
        ("remove", [amount_a, amount_b]) => Command::RemoveLiquidity {
            amount_a: (*amount_a).to_owned(),
            amount_b: (*amount_b).to_owned(),
        },
        ("price", [address]) => Command::Price((*address).to_owned()),
        ("price", []) => Command::Price(String::new()),
        ("check", [address]) => Command::CheckAddress((*address).to_owned()),
        ("clear-price", []) => Command::ClearPrice,
        ("last", [kind]) => Command::Last(parse_kind(kind)?),
        ("help", _) => Command::Help,
        ("quit" | "exit", _) => Command::Quit,
        (other, _) => bail!("unrecognized command `{other}`; type `help`"),
    };
    Ok(Some(command))
}

fn parse_kind(raw: &str) -> anyhow::Result<OperationKind> {
    let kind = match raw.to_ascii_lowercase().as_str() {
        "swap-a" => OperationKind::SwapAforB,
        "swap-b" => OperationKind::SwapBforA,
        "add" => OperationKind::AddLiquidity,
        "remove" => OperationKind::RemoveLiquidity,
        other => match OperationKind::ALL.into_iter().find(|kind| kind.as_str() == other) {
            Some(kind) => kind,
            None => bail!("unknown transaction kind `{other}`"),
        },
    };
    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_actions() {
        assert_eq!(parse("  ").unwrap(), None);
        assert_eq!(parse("Connect").unwrap(), Some(Command::Connect));
        assert_eq!(
            parse("swap b 0.5").unwrap(),
            Some(Command::Swap {
                direction: SwapDirection::BforA,
                amount: "0.5".to_owned()
            })
        );
        assert_eq!(
            parse("remove 1 2").unwrap(),
            Some(Command::RemoveLiquidity {
                amount_a: "1".to_owned(),
                amount_b: "2".to_owned()
            })
        );
        assert_eq!(parse("price").unwrap(), Some(Command::Price(String::new())));
        assert_eq!(parse("exit").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn amounts_are_not_validated_here() {
        assert_eq!(
            parse("swap a -3").unwrap(),
            Some(Command::Swap {
                direction: SwapDirection::AforB,
                amount: "-3".to_owned()
            })
        );
    }

    #[test]
    fn parses_transaction_kinds() {
        assert_eq!(
            parse("last swap-a").unwrap(),
            Some(Command::Last(OperationKind::SwapAforB))
        );
        assert_eq!(
            parse("last remove_liquidity").unwrap(),
            Some(Command::Last(OperationKind::RemoveLiquidity))
        );
        assert!(parse("last nothing").is_err());
    }

    #[test]
    fn rejects_unknown_input() {
        assert!(parse("swap c 1").is_err());
        assert!(parse("swap a").is_err());
        assert!(parse("teleport").is_err());
    }
}
