use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gbfsm_core::StateMachine;
use gbfsm_sv::{RenderOptions, Section, SvRenderer};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Instruction table in Opcodes.json format.
    #[arg(default_value = "Opcodes.json")]
    pub table: PathBuf,

    /// Write the generated code here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Sections to emit, in order. Repeat to select several.
    #[arg(long = "section", value_enum)]
    pub sections: Vec<SectionArg>,

    /// Label column width of next-state assignments.
    #[arg(long, default_value_t = 16)]
    pub transition_width: usize,

    /// Label column width of the control-signal template.
    #[arg(long, default_value_t = 40)]
    pub stub_width: usize,

    /// Width the instruction comment is centred in.
    #[arg(long, default_value_t = 15)]
    pub comment_width: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SectionArg {
    States,
    Dispatch,
    Transitions,
    Stubs,
    Mnemonics,
}

impl From<SectionArg> for Section {
    fn from(arg: SectionArg) -> Self {
        match arg {
            SectionArg::States => Section::States,
            SectionArg::Dispatch => Section::Dispatch,
            SectionArg::Transitions => Section::Transitions,
            SectionArg::Stubs => Section::Stubs,
            SectionArg::Mnemonics => Section::MnemonicStrings,
        }
    }
}

impl Cli {
    pub fn render_options(&self) -> RenderOptions {
        let sections = if self.sections.is_empty() {
            Section::DEFAULT.to_vec()
        } else {
            self.sections.iter().copied().map(Section::from).collect()
        };
        RenderOptions::builder()
            .sections(sections)
            .transition_label_width(self.transition_width)
            .stub_width(self.stub_width)
            .comment_width(self.comment_width)
            .build()
    }
}

/// Load the table, derive the state machine and write it out.
pub fn run(cli: &Cli) -> Result<()> {
    let table = gbfsm_common::load_table(&cli.table)?;
    let machine = gbfsm_core::generate(&table)
        .with_context(|| format!("cannot build control unit from '{}'", cli.table.display()))?;
    let renderer = SvRenderer::new(cli.render_options());

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create '{}'", path.display()))?;
            write_machine(&renderer, &machine, BufWriter::new(file))?;
            log::info!("Wrote control unit to '{}'", path.display());
        }
        None => write_machine(&renderer, &machine, io::stdout().lock())?,
    }
    Ok(())
}

fn write_machine(renderer: &SvRenderer, machine: &StateMachine, mut out: impl Write) -> Result<()> {
    renderer.render(machine, &mut out)?;
    out.flush()?;
    Ok(())
}
