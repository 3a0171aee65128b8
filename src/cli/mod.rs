mod input;
pub mod render;
mod session;

pub use input::{
    parse_choice, parse_cron_job, parse_currency, parse_email, parse_price, parse_text, parse_url,
    parse_yes_no, ExternalText,
};
pub use session::Session;

use crate::db::{Database, NewProduct, TrackedProduct, User};
use crate::errors::{AppErrors, ValidationError};
use crate::notify::format_price;
use render::{render, Screen};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::debug;

const CHECKED_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Unwraps an answer, leaving the dialogue when input has run out.
macro_rules! answer {
    ($asked:expr) => {
        match $asked? {
            Some(value) => value,
            None => return Ok(Flow::Quit),
        }
    };
}

/// Interactive dialogue over any line reader and writer.
pub struct Shell<R, W> {
    db: Arc<Database>,
    input: R,
    output: W,
    session: Session,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(db: Arc<Database>, input: R, output: W) -> Self {
        Self {
            db,
            input,
            output,
            session: Session::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn run(&mut self) -> Result<(), AppErrors> {
        self.show(&render::welcome())?;
        let known_user = self.db.all_users().await?.into_iter().next();
        let flow = match known_user {
            Some(user) => {
                let name = (!user.name.is_empty()).then_some(user.name.as_str());
                self.show(&render::welcome_back(name))?;
                self.session.user = Some(user);
                Flow::Continue
            }
            None => self.onboarding().await?,
        };

        if flow == Flow::Continue {
            while self.main_menu().await? == Flow::Continue {}
        }
        self.show(&render::goodbye())
    }

    async fn main_menu(&mut self) -> Result<Flow, AppErrors> {
        self.show(&render::main_menu())?;
        let choice = answer!(self.ask("Your choice", |raw| parse_choice(raw, 5)));
        debug!(choice, "main menu");
        match choice {
            1 => self.track_product().await,
            2 => self.tracked_products().await,
            3 => self.app_settings().await,
            4 => self.email_notifications().await,
            5 => {
                self.show(&render::help())?;
                Ok(Flow::Continue)
            }
            _ => Ok(Flow::Quit),
        }
    }

    async fn onboarding(&mut self) -> Result<Flow, AppErrors> {
        self.show(&render::new_user())?;
        let name = answer!(self.ask("Your name", parse_text));
        let mut user = User::new(&name);
        self.show(&render::notifications_offer(&name))?;
        if answer!(self.ask("y/n", parse_yes_no)) {
            let email = answer!(self.ask("Email address", parse_email));
            user.set_email(&email)?;
            user.enable_notifications()?;
            self.say(&format!("Done! Price alerts will be sent to {email}."))?;
        } else {
            self.say("All good, you can always set up email notifications")?;
            self.say("later on the [4] Email notifications page.")?;
        }
        self.db.save_user(&user).await?;
        self.session.user = Some(user);
        self.show(&render::ready())?;
        Ok(Flow::Continue)
    }

    async fn track_product(&mut self) -> Result<Flow, AppErrors> {
        let Some(user) = self.session.user.clone() else {
            return Ok(Flow::Continue);
        };
        self.show(
            &Screen::new("Track a new product")
                .line("Tell us what to watch and what you'd like to pay."),
        )?;
        let name = answer!(self.ask("Product name", parse_text));
        let url = answer!(self.ask("Product link", parse_url));
        let threshold = answer!(self.ask("Alert me at or below", parse_price));
        let currency = answer!(self.ask("Currency (e.g. £ or GBP)", parse_currency));
        let target = format_price(threshold, currency.as_str());
        let new_product = NewProduct {
            name,
            url,
            threshold,
            currency,
        };
        match TrackedProduct::new(user.id, new_product) {
            Ok(product) => {
                self.db.save_product(&product).await?;
                self.say(&format!(
                    "Now tracking {}. We'll let you know once it costs {} or less.",
                    product.name, target
                ))?;
                if !user.notifications_enabled {
                    self.say("Email notifications are off, turn them on in [4] to get alerts.")?;
                }
            }
            Err(e) => self.say(&format!("Could not track this product: {e}"))?,
        }
        Ok(Flow::Continue)
    }

    async fn tracked_products(&mut self) -> Result<Flow, AppErrors> {
        let Some(user_id) = self.session.user_id() else {
            return Ok(Flow::Continue);
        };
        let products = self.db.products_for(user_id).await?;
        if products.is_empty() {
            self.show(
                &Screen::new("My tracked products")
                    .line("You are not tracking anything yet.")
                    .line("Pick [1] in the main menu to start."),
            )?;
            return Ok(Flow::Continue);
        }

        let mut screen = Screen::new("My tracked products");
        for (number, product) in products.iter().enumerate() {
            screen = screen.option(&(number + 1).to_string(), &describe(product));
        }
        screen = screen
            .line("Pick a number to stop tracking it.")
            .option("0", "Back");
        self.show(&screen)?;

        let choice = answer!(self.ask("Your choice", |raw| parse_choice(raw, products.len())));
        if choice == 0 {
            return Ok(Flow::Continue);
        }
        let product = &products[choice - 1];
        self.db.delete_product(product.id).await?;
        self.say(&format!("Stopped tracking {}.", product.name))?;
        Ok(Flow::Continue)
    }

    async fn app_settings(&mut self) -> Result<Flow, AppErrors> {
        let Some(mut user) = self.session.user.clone() else {
            return Ok(Flow::Continue);
        };
        self.show(
            &Screen::new("App settings")
                .line(&format!("Your name: {}", user.display_name()))
                .option("1", "Change my name")
                .option("0", "Back"),
        )?;
        if answer!(self.ask("Your choice", |raw| parse_choice(raw, 1))) == 0 {
            return Ok(Flow::Continue);
        }
        user.name = answer!(self.ask("New name", parse_text));
        self.db.save_user(&user).await?;
        self.say(&format!("Done, we will call you {} from now on.", user.name))?;
        self.session.user = Some(user);
        Ok(Flow::Continue)
    }

    async fn email_notifications(&mut self) -> Result<Flow, AppErrors> {
        let Some(mut user) = self.session.user.clone() else {
            return Ok(Flow::Continue);
        };
        let status = if user.notifications_enabled { "on" } else { "off" };
        self.show(
            &Screen::new("Email notifications")
                .line(&format!(
                    "Email address: {}",
                    user.email.as_deref().unwrap_or("not set")
                ))
                .line(&format!("Notifications: {status}"))
                .option("1", "Set email address")
                .option("2", "Turn notifications on")
                .option("3", "Turn notifications off")
                .option("0", "Back"),
        )?;
        match answer!(self.ask("Your choice", |raw| parse_choice(raw, 3))) {
            1 => {
                let email = answer!(self.ask("Email address", parse_email));
                user.set_email(&email)?;
                self.say("Email address saved.")?;
            }
            2 => match user.enable_notifications() {
                Ok(()) => self.say("Notifications are on.")?,
                Err(e) => {
                    self.say(&format!("{e}. Set a valid email address first."))?;
                    return Ok(Flow::Continue);
                }
            },
            3 => {
                user.disable_notifications();
                self.say("Notifications are off.")?;
            }
            _ => return Ok(Flow::Continue),
        }
        self.db.save_user(&user).await?;
        self.session.user = Some(user);
        Ok(Flow::Continue)
    }

    fn show(&mut self, screen: &Screen) -> Result<(), AppErrors> {
        write!(self.output, "{}", render(screen))?;
        self.output.flush()?;
        Ok(())
    }

    fn say(&mut self, text: &str) -> Result<(), AppErrors> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>, AppErrors> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    /// Re-asks until `parse` accepts the answer. `None` once input is exhausted.
    fn ask<T>(
        &mut self,
        prompt: &str,
        parse: impl Fn(&str) -> Result<T, ValidationError>,
    ) -> Result<Option<T>, AppErrors> {
        loop {
            write!(self.output, "{prompt} > ")?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                writeln!(self.output)?;
                return Ok(None);
            };
            match parse(&line) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => writeln!(self.output, "{e}. Let's try again.")?,
            }
        }
    }
}

fn describe(product: &TrackedProduct) -> String {
    let currency = product.currency.as_str();
    let last_seen = match (product.last_price, product.last_checked) {
        (Some(price), Some(checked)) => format!(
            "{} on {}",
            format_price(price, currency),
            checked.format(CHECKED_FORMAT)
        ),
        (Some(price), None) => format_price(price, currency),
        _ => "not checked yet".to_string(),
    };
    format!(
        "{}  alert at {}  last price {}",
        product.name,
        format_price(product.threshold, currency),
        last_seen
    )
}
