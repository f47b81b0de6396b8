//! Line-oriented shell over a [`Session`].

use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use hashchain_core::{BlockView, ChainError, Session};
use serde_json::to_string_pretty;
use tracing::{debug, warn};

use crate::render;

const HELP: &str = "\
Commands:
  create [TEXT]               create a new chain (replaces the current one)
  add                         add a block; enter one transaction per line, blank line to finish
  print                       print every block
  update <BLOCK> <TX> <TEXT>  replace transaction TX (1-based) of block BLOCK
  tree <BLOCK>                print the Merkle tree of a block
  validate <BLOCK>            check a block's Merkle root against its transactions
  help                        show this help
  exit                        quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create(Option<String>),
    Add,
    Print,
    Update { block: i64, tx: i64, data: String },
    Tree(i64),
    Validate(i64),
    Help,
    Exit,
}

fn parse_number(arg: Option<&str>, what: &str) -> Result<i64> {
    let arg = arg.ok_or_else(|| anyhow!("missing {what}"))?;
    arg.parse()
        .with_context(|| format!("{what} must be a number, got {arg:?}"))
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim_start()),
            None => (line, ""),
        };
        let first_arg = rest.split_whitespace().next();
        let cmd = match name.to_ascii_lowercase().as_str() {
            "create" => Command::Create((!rest.is_empty()).then(|| rest.to_string())),
            "add" => Command::Add,
            "print" => Command::Print,
            "update" => {
                let mut args = rest.splitn(3, char::is_whitespace);
                let block = parse_number(args.next(), "block number")?;
                let tx = parse_number(args.next(), "transaction number")?;
                let data = args.next().unwrap_or_default().to_string();
                Command::Update { block, tx, data }
            }
            "tree" => Command::Tree(parse_number(first_arg, "block number")?),
            "validate" => Command::Validate(parse_number(first_arg, "block number")?),
            "help" | "?" => Command::Help,
            "exit" | "quit" => Command::Exit,
            other => bail!("unknown command {other:?}, try `help`"),
        };
        Ok(cmd)
    }
}

/// Negative block numbers are rejected here and never reach the chain.
fn block_index(block: i64) -> Result<usize> {
    usize::try_from(block).map_err(|_| anyhow!("invalid block number {block}"))
}

/// Converts a 1-based transaction number to an index.
fn tx_index(tx: i64) -> Result<usize> {
    tx.checked_sub(1)
        .and_then(|i| usize::try_from(i).ok())
        .ok_or_else(|| anyhow!("invalid transaction number {tx}"))
}

/// Reports a bad transaction index as the 1-based number the user typed.
fn tx_number_error(err: ChainError) -> anyhow::Error {
    match err {
        ChainError::InvalidTransactionIndex { block, index, len } => {
            let number = index + 1;
            anyhow!("invalid transaction number {number} (block {block} has {len} transactions)")
        }
        other => other.into(),
    }
}

#[derive(Debug, Clone)]
pub struct ShellOptions {
    pub genesis_data: String,
    pub json: bool,
}

pub struct Shell<R, W> {
    session: Session,
    input: R,
    out: W,
    options: ShellOptions,
}

enum Flow {
    Continue,
    Exit,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, out: W, options: ShellOptions) -> Self {
        Self {
            session: Session::new(),
            input,
            out,
            options,
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &Session {
        &self.session
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Runs until `exit` or end of input.
    pub fn run(&mut self) -> Result<()> {
        writeln!(self.out, "{HELP}")?;
        loop {
            write!(self.out, "> ")?;
            self.out.flush()?;
            let Some(line) = self.read_line()? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            let outcome = line.parse::<Command>().and_then(|cmd| {
                debug!(?cmd, "executing");
                self.execute(cmd)
            });
            match outcome {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break,
                Err(err) => self.report(err)?,
            }
        }
        writeln!(self.out, "Exiting...")?;
        Ok(())
    }

    fn report(&mut self, err: anyhow::Error) -> Result<()> {
        if let Some(ChainError::Uninitialized) = err.downcast_ref::<ChainError>() {
            writeln!(self.out, "Create Blockchain first!")?;
        } else {
            warn!(error = %err, "command failed");
            writeln!(self.out, "error: {err:#}")?;
        }
        Ok(())
    }

    fn execute(&mut self, cmd: Command) -> Result<Flow> {
        match cmd {
            Command::Create(data) => {
                let data = data.unwrap_or_else(|| self.options.genesis_data.clone());
                self.session.create_chain(data);
                let genesis = self.session.describe_block(0)?;
                self.print_block(&genesis)?;
            }
            Command::Add => self.add_block()?,
            Command::Print => {
                for view in self.session.describe_chain()? {
                    self.print_block(&view)?;
                }
            }
            Command::Update { block, tx, data } => {
                self.session.chain()?;
                let block = block_index(block)?;
                let tx = tx_index(tx)?;
                self.session
                    .update_transaction(block, tx, data)
                    .map_err(tx_number_error)?;
                writeln!(self.out, "Transaction Updated!")?;
            }
            Command::Tree(block) => {
                self.session.chain()?;
                let nodes = self.session.describe_merkle_tree(block_index(block)?)?;
                if self.options.json {
                    writeln!(self.out, "{}", to_string_pretty(&nodes)?)?;
                } else {
                    write!(self.out, "{}", render::merkle_tree(&nodes))?;
                }
            }
            Command::Validate(block) => {
                self.session.chain()?;
                if self.session.verify_block(block_index(block)?)? {
                    writeln!(self.out, "Valid Block!")?;
                } else {
                    writeln!(self.out, "Invalid Block!")?;
                }
            }
            Command::Help => writeln!(self.out, "{HELP}")?,
            Command::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    fn add_block(&mut self) -> Result<()> {
        self.session.chain()?;
        writeln!(
            self.out,
            "Create transaction, one per line. Enter a blank line to finish!"
        )?;
        let mut payloads = Vec::new();
        while let Some(line) = self.read_line()? {
            if line.is_empty() {
                break;
            }
            payloads.push(line);
            writeln!(self.out, "Transaction added!")?;
        }
        if payloads.is_empty() {
            writeln!(self.out, "No transactions entered!")?;
            return Ok(());
        }
        let index = self.session.append_block(payloads)?.index();
        writeln!(self.out, "Block {index} added!")?;
        Ok(())
    }

    fn print_block(&mut self, view: &BlockView) -> Result<()> {
        if self.options.json {
            writeln!(self.out, "{}", to_string_pretty(view)?)?;
        } else {
            writeln!(self.out, "{}", render::block(view))?;
        }
        Ok(())
    }
}
