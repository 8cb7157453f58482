//! Interactive librarian menu.
//!
//! Thin glue over [`Catalog`] and [`Ledger`]: it gathers input through a
//! [`Prompt`], builds records with [`Record::builder`], and reports outcomes.
//! Rejections (duplicate keys, invalid input, unavailable records) are shown
//! to the user and the menu continues.

use crate::error::Result;
use crate::prompt::Prompt;
use shelf_catalog::{Catalog, Record, SearchField};
use shelf_circulation::Ledger;
use shelf_circulation::error::ErrorKind as CirculationErrorKind;
use std::io::{BufRead, Write};

const MENU: &str = "\
Menu:
1 - Catalog report
2 - Add record
3 - Remove record by key
4 - Lend record
5 - Receive returned record
6 - List records
7 - List active loans
8 - Search
0 - Exit";

/// Whether the menu loop should keep going.
enum Flow {
    Continue,
    Exit,
}

/// Unwraps an answer, or leaves the current action when input has ended.
macro_rules! answer {
    ($ask:expr) => {
        match $ask? {
            Some(answer) => answer,
            None => return Ok(Flow::Exit),
        }
    };
}

pub struct Console<'a, R, W> {
    catalog: &'a Catalog,
    ledger: Ledger,
    prompt: Prompt<R, W>,
}

impl<'a, R: BufRead, W: Write> Console<'a, R, W> {
    pub fn new(catalog: &'a Catalog, ledger: Ledger, prompt: Prompt<R, W>) -> Self {
        Self { catalog, ledger, prompt }
    }

    /// Run the menu until the user exits or input ends.
    pub fn run(&mut self) -> Result<()> {
        self.prompt.say("=== Library catalog (console) ===")?;
        loop {
            self.prompt.say("")?;
            self.prompt.say(MENU)?;
            let Some(choice) = self.prompt.ask_parsed::<u8>("Choose an option: ")? else {
                break;
            };
            let flow = match choice {
                1 => self.report()?,
                2 => self.add()?,
                3 => self.remove()?,
                4 => self.lend()?,
                5 => self.receive()?,
                6 => self.list_records()?,
                7 => self.list_loans()?,
                8 => self.search()?,
                0 => Flow::Exit,
                _ => {
                    self.prompt.say("Invalid option. Please try again.")?;
                    Flow::Continue
                },
            };
            if let Flow::Exit = flow {
                break;
            }
        }
        self.prompt.say("Goodbye!")?;
        Ok(())
    }

    fn report(&mut self) -> Result<Flow> {
        self.prompt.say(self.catalog.statistics_report())?;
        Ok(Flow::Continue)
    }

    fn add(&mut self) -> Result<Flow> {
        self.prompt.say("--- Add record ---")?;
        let key = answer!(self.prompt.ask_required("Key / ISBN (hyphens and spaces allowed): "));
        if self.catalog.contains_key(&key) {
            self.prompt.say("A record with this key already exists. Aborted.")?;
            return Ok(Flow::Continue);
        }
        let title = answer!(self.prompt.ask_required("Title: "));
        let author = answer!(self.prompt.ask_required("Primary author: "));
        let secondary = answer!(self.prompt.ask("Secondary authors, comma separated (optional): "));
        let publisher = answer!(self.prompt.ask("Publisher (optional): "));
        let year = answer!(self.prompt.ask_optional::<i32>("Publication year (optional): "));
        let pages = answer!(self.prompt.ask_optional::<u32>("Page count (optional): "));
        let category = answer!(self.prompt.ask("Category (optional): "));
        let language = answer!(self.prompt.ask("Language (optional): "));
        let location = answer!(self.prompt.ask("Location (optional): "));

        let mut builder = Record::builder(key, title)
            .author(author)
            .secondary_authors(secondary.split(','))
            .publisher(publisher)
            .pages(pages.unwrap_or_default())
            .category(category)
            .language(language)
            .location(location);
        if let Some(year) = year {
            builder = builder.year(year);
        }
        let record = match builder.build() {
            Ok(record) => record,
            Err(err) => {
                self.prompt.say(format!("Could not create record: {}", &*err))?;
                return Ok(Flow::Continue);
            },
        };
        let summary = record.to_string();
        match self.catalog.insert(record) {
            true => self.prompt.say(format!("Record added: {summary}"))?,
            false => self.prompt.say("Could not add record: duplicate key.")?,
        }
        Ok(Flow::Continue)
    }

    fn remove(&mut self) -> Result<Flow> {
        self.prompt.say("--- Remove record ---")?;
        let key = answer!(self.prompt.ask_required("Key of the record to remove: "));
        if let Some(loan) = self.ledger.active(&key) {
            let warning = format!("Warning: this record is on loan: {loan}");
            self.prompt.say(warning)?;
            if !answer!(self.prompt.confirm("Remove it anyway?")) {
                self.prompt.say("Removal cancelled.")?;
                return Ok(Flow::Continue);
            }
            self.ledger.forget(&key);
        }
        match self.catalog.remove_by_key(&key) {
            true => self.prompt.say("Record removed.")?,
            false => self.prompt.say("No record with this key.")?,
        }
        Ok(Flow::Continue)
    }

    fn lend(&mut self) -> Result<Flow> {
        self.prompt.say("--- Lend record ---")?;
        let key = answer!(self.prompt.ask_required("Key of the record to lend: "));
        match self.catalog.find_by_key(&key) {
            None => {
                self.prompt.say("No record with this key.")?;
                return Ok(Flow::Continue);
            },
            Some(record) if !record.is_available() => {
                self.prompt.say("This record is currently unavailable.")?;
                return Ok(Flow::Continue);
            },
            Some(_) => {},
        }
        let borrower = answer!(self.prompt.ask_required("Borrower full name: "));
        let phone = loop {
            let phone = answer!(self.prompt.ask_required("Mobile phone (digits only): "));
            if self.ledger.policy().is_valid(&phone) {
                break phone;
            }
            self.prompt.say("Invalid phone number. Use digits only.")?;
        };
        match self.ledger.lend(self.catalog, &key, &borrower, &phone) {
            Ok(loan) => self.prompt.say(format!("Loan registered: {loan}"))?,
            Err(err) => self.prompt.say(format!("Could not register loan: {}", &*err))?,
        }
        Ok(Flow::Continue)
    }

    fn receive(&mut self) -> Result<Flow> {
        self.prompt.say("--- Receive returned record ---")?;
        let key = answer!(self.prompt.ask_required("Key of the returned record: "));
        let phone = answer!(self.prompt.ask_required("Borrower mobile phone (digits only): "));
        let receipt = match self.ledger.receive(self.catalog, &key, &phone, false) {
            Err(err) if matches!(&*err, CirculationErrorKind::PhoneMismatch(_)) => {
                self.prompt.say("Warning: the phone number does not match the loan record.")?;
                if !answer!(self.prompt.confirm("Accept the return anyway?")) {
                    self.prompt.say("Return cancelled. Check the details with the borrower.")?;
                    return Ok(Flow::Continue);
                }
                self.ledger.receive(self.catalog, &key, &phone, true)
            },
            other => other,
        };
        match receipt {
            Ok(receipt) => {
                if !receipt.cataloged {
                    self.prompt.say("Note: the record is no longer in the catalog.")?;
                }
                self.prompt.say("Return registered.")?;
            },
            Err(err) => self.prompt.say(format!("Could not register return: {}", &*err))?,
        }
        Ok(Flow::Continue)
    }

    fn list_records(&mut self) -> Result<Flow> {
        self.prompt.say("--- Records ---")?;
        let records = self.catalog.records();
        if records.is_empty() {
            self.prompt.say("No records.")?;
        }
        for record in records {
            self.prompt.say(record)?;
        }
        Ok(Flow::Continue)
    }

    fn list_loans(&mut self) -> Result<Flow> {
        self.prompt.say("--- Active loans ---")?;
        let lines: Vec<String> = self.ledger.loans().iter().map(ToString::to_string).collect();
        if lines.is_empty() {
            self.prompt.say("No active loans.")?;
        }
        for line in lines {
            self.prompt.say(line)?;
        }
        Ok(Flow::Continue)
    }

    fn search(&mut self) -> Result<Flow> {
        self.prompt.say("--- Search ---")?;
        let fields = SearchField::ALL.map(|f| f.as_str()).join("/");
        let field = loop {
            let answer = answer!(self.prompt.ask_required(&format!("Field ({fields}): ")));
            match answer.parse::<SearchField>() {
                Ok(field) => break field,
                Err(err) => self.prompt.say(&*err)?,
            }
        };
        let term = answer!(self.prompt.ask_required("Search term: "));
        let results = self.catalog.search(field, &term);
        self.prompt.say(format!("{} result(s):", results.len()))?;
        for record in results {
            self.prompt.say(record)?;
        }
        Ok(Flow::Continue)
    }
}
