use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "yatube-server", version, about = "Yatube: блог с группами и профилями")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Запуск HTTP сервера (по умолчанию).
    Serve,
    /// Создание группы; у групп нет веб-интерфейса.
    CreateGroup {
        #[arg(long)]
        title: String,
        #[arg(long)]
        slug: String,
        #[arg(long, default_value = "")]
        description: String,
    },
}

impl Cli {
    pub(crate) fn command(self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }
}
