//! Renders a [`StateMachine`] as SystemVerilog fragments meant to be pasted
//! into a control-unit module: the state `enum` body, the `case` bodies of
//! the next-state logic and an empty control-signal template.

use std::io::Write;

use anyhow::Result;
use gbfsm_common::OpcodeSpace;
use gbfsm_core::{StateMachine, Stub};
use typed_builder::TypedBuilder;

const BANNER_LEFT: &str = "/////////////////////////////////////";
const BANNER_RIGHT: &str = "////////////////////////";
const HEADING_RULE: &str = "==============================";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// `NAME,` lines for the state enumeration.
    States,
    /// `FETCH` and `PREFIX_CB` case bodies.
    Dispatch,
    /// Intra-instruction next-state assignments plus the `default` arm.
    Transitions,
    /// Control-signal template, one line per normal state.
    Stubs,
    /// Opcode to instruction text, for debug displays.
    MnemonicStrings,
}

impl Section {
    pub const DEFAULT: [Section; 4] = [
        Section::States,
        Section::Dispatch,
        Section::Transitions,
        Section::Stubs,
    ];
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct RenderOptions {
    #[builder(default = Section::DEFAULT.to_vec())]
    pub sections: Vec<Section>,
    /// Column the `:` of a next-state assignment is aligned after.
    #[builder(default = 16)]
    pub transition_label_width: usize,
    /// Column the `:` of a template line is aligned after.
    #[builder(default = 40)]
    pub stub_width: usize,
    /// Width the instruction text is centred in.
    #[builder(default = 15)]
    pub comment_width: usize,
    #[builder(default = 24)]
    pub stub_indent: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions::builder().build()
    }
}

pub struct SvRenderer {
    options: RenderOptions,
}

impl SvRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn render(&self, machine: &StateMachine, out: &mut impl Write) -> Result<()> {
        for section in &self.options.sections {
            log::debug!("Rendering {:?} section", section);
            match section {
                Section::States => self.render_states(machine, out)?,
                Section::Dispatch => self.render_dispatch(machine, out)?,
                Section::Transitions => self.render_transitions(machine, out)?,
                Section::Stubs => self.render_stubs(machine, out)?,
                Section::MnemonicStrings => self.render_mnemonic_strings(machine, out)?,
            }
        }
        Ok(())
    }

    pub fn render_to_string(&self, machine: &StateMachine) -> Result<String> {
        let mut buffer = Vec::new();
        self.render(machine, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    fn render_states(&self, machine: &StateMachine, out: &mut impl Write) -> Result<()> {
        banner(out, "State declaration")?;
        for state in machine.states() {
            writeln!(out, "{},", state.id)?;
        }
        Ok(())
    }

    fn render_dispatch(&self, machine: &StateMachine, out: &mut impl Write) -> Result<()> {
        banner(out, "Next State Assignments")?;
        for space in OpcodeSpace::ALL {
            heading(out, &format!("{} next state", space.dispatch_state()))?;
            for entry in machine.dispatch_for(space) {
                writeln!(out, "{} : Next_state = {};", case_label(entry.code), entry.target)?;
            }
        }
        Ok(())
    }

    fn render_transitions(&self, machine: &StateMachine, out: &mut impl Write) -> Result<()> {
        let width = self.options.transition_label_width;
        heading(out, "all other next state")?;
        for transition in machine.transitions() {
            writeln!(
                out,
                "{:<width$} : Next_state = {};",
                transition.from.name(),
                transition.to
            )?;
        }
        // Terminal states are not listed; they all land here.
        writeln!(out, "{:<width$} : Next_state = FETCH;", "default")?;
        Ok(())
    }

    fn render_stubs(&self, machine: &StateMachine, out: &mut impl Write) -> Result<()> {
        banner(out, "State control signal template")?;
        for stub in machine.stubs() {
            let label = self.stub_label(stub);
            writeln!(out, "{:<width$} : ;", label, width = self.options.stub_width)?;
        }
        Ok(())
    }

    fn stub_label(&self, stub: &Stub) -> String {
        match &stub.comment {
            Some(comment) => format!(
                "/*{:^width$}*/     {}",
                comment,
                stub.state,
                width = self.options.comment_width
            ),
            None => format!("{}{}", " ".repeat(self.options.stub_indent), stub.state),
        }
    }

    fn render_mnemonic_strings(&self, machine: &StateMachine, out: &mut impl Write) -> Result<()> {
        banner(out, "Mnemonic strings")?;
        for space in OpcodeSpace::ALL {
            heading(out, &format!("{} mnemonic strings", space.dispatch_state()))?;
            let commented = machine
                .stubs()
                .iter()
                .filter(|stub| stub.state.space() == space)
                .filter_map(|stub| Some((stub.state.code(), stub.comment.as_deref()?)));
            for (code, text) in commented {
                writeln!(out, "{} : mnemonic_str = \"{}\";", case_label(code), text)?;
            }
        }
        Ok(())
    }
}

fn banner(out: &mut impl Write, title: &str) -> Result<()> {
    writeln!(out, "{} {} {}", BANNER_LEFT, title, BANNER_RIGHT)?;
    Ok(())
}

fn heading(out: &mut impl Write, title: &str) -> Result<()> {
    writeln!(out, "{} {}", title, HEADING_RULE)?;
    Ok(())
}

/// SystemVerilog 8-bit literal, e.g. `8'h0A`.
fn case_label(code: u8) -> String {
    format!("8'h{:02X}", code)
}
