const WIDTH: usize = 60;
const BORDER: &str = "** ** ** ** ** ** ** ** ** ** ** ** ** ** ** ** ** ** ** **";
const OPTION_INDENT: &str = "               ";

/// Everything one dialogue step shows before asking for input.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Screen {
    pub title: String,
    pub body: Vec<String>,
    pub options: Vec<(String, String)>,
}

impl Screen {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub fn line(mut self, text: &str) -> Self {
        self.body.push(text.to_string());
        self
    }

    pub fn option(mut self, key: &str, label: &str) -> Self {
        self.options.push((key.to_string(), label.to_string()));
        self
    }
}

pub fn center(text: &str) -> String {
    format!("{:^width$}", text, width = WIDTH)
        .trim_end()
        .to_string()
}

pub fn render(screen: &Screen) -> String {
    let mut lines = vec![BORDER.to_string()];
    if !screen.title.is_empty() {
        lines.push(center(&format!("\\  {}  /", screen.title.to_uppercase())));
        lines.push(String::new());
    }
    lines.extend(screen.body.iter().map(|line| center(line)));
    if !screen.options.is_empty() {
        lines.push(String::new());
        lines.extend(
            screen
                .options
                .iter()
                .map(|(key, label)| format!("{OPTION_INDENT}[ {key} ]  {label}")),
        );
    }
    lines.push(BORDER.to_string());
    lines.push(String::new());
    lines.join("\n")
}

pub fn welcome() -> Screen {
    Screen::new("Price Tracker")
        .line("Hello and welcome!")
        .line("We watch prices so you don't have to.")
}

pub fn new_user() -> Screen {
    Screen::new("New here?")
        .line("I see that you are new around here.")
        .line("How about we set up a few things first?")
        .line("")
        .line("For example, what is your name?")
}

pub fn notifications_offer(name: &str) -> Screen {
    Screen::new("Email notifications")
        .line(&format!("Great! Nice to meet you {name}."))
        .line("We can notify you by email of any price drop")
        .line("within the range of your choice,")
        .line("would you like to set it up? (y/n)")
}

pub fn ready() -> Screen {
    Screen::new("All set")
        .line("Oki doke!")
        .line("Now that you know how to use Price Tracker,")
        .line("it's time to jump into business!")
        .line("")
        .line("€ * £ * ¥ * $")
}

pub fn welcome_back(name: Option<&str>) -> Screen {
    let greeting = match name {
        Some(name) => Screen::new("Welcome back").line(&format!("Welcome back {name}!")),
        None => Screen::new("Welcome back")
            .line("It seems like we had an issue getting your name.")
            .line("We suggest you reset it from [3] App settings :)"),
    };
    greeting.line("What would you like").line("to do today?")
}

pub fn main_menu() -> Screen {
    Screen::new("Main menu")
        .line("What would you like to do?")
        .option("1", "Track a new product")
        .option("2", "My tracked products")
        .option("3", "App settings")
        .option("4", "Email notifications")
        .option("5", "Help")
        .option("0", "Exit")
}

pub fn help() -> Screen {
    Screen::new("Help")
        .line("[1] registers a product link and the price you want to pay.")
        .line("[2] lists what you track and lets you stop tracking.")
        .line("[3] changes the name we greet you with.")
        .line("[4] sets your email address and switches alerts on or off.")
        .line("")
        .line("Prices are checked by the scheduled job:")
        .line("price-tracker cron_job=true")
        .line("Add --repeat to keep checking on an interval.")
}

pub fn goodbye() -> Screen {
    Screen::new("Goodbye")
        .line("Thank you for using")
        .line("Price Tracker!")
        .line("*   *   *")
}
