#![forbid(unsafe_code)]

//! A scripted ARTview session.
//!
//! [`run`] builds a context backed by the synthetic loader and gridder,
//! switches through the planned modes, drives the panels the way a user
//! would, and reports the resulting wiring and what each display drew.

use std::fmt;
use std::rc::Rc;

use artview_core::{
    AppContext, ArtviewConfig, Component, ComponentFactory, ComponentSpec, WindowHandle,
    change_mode, downcast_rc, linked_groups,
};
use artview_panels::{
    DatasetLoader, FileNavigator, GridDisplay, Gridder, LinkInspector, Mapper, Menu, PanelError,
    RadarDisplay, SyntheticGridder, SyntheticLoader, component_catalog, modes_for,
};
use serde::Serialize;
use tracing::{info, info_span};

const MAIN_WINDOW_ID: u64 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// What a session does, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionPlan {
    pub modes: Vec<String>,
    pub open: Vec<String>,
    pub steps: usize,
    pub grid: bool,
    pub inspect: bool,
}

#[derive(Debug)]
pub enum SessionError {
    Panel(PanelError),
    /// The plan needs a panel none of the assembled modes provide.
    NoPanel(&'static str),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Panel(e) => write!(f, "{e}"),
            Self::NoPanel(name) => write!(f, "no {name} in the assembled modes"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Panel(e) => Some(e),
            Self::NoPanel(_) => None,
        }
    }
}

impl From<PanelError> for SessionError {
    fn from(e: PanelError) -> Self {
        Self::Panel(e)
    }
}

impl From<artview_core::Error> for SessionError {
    fn from(e: artview_core::Error) -> Self {
        Self::Panel(PanelError::Core(e))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeReport {
    pub name: String,
    pub reused: usize,
    pub created: usize,
    pub rebound: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentReport {
    pub name: String,
    pub type_name: String,
    pub shared: Vec<String>,
}

/// One cell held by more than one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    pub cell: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarSummary {
    pub path: String,
    pub field: String,
    pub tilt: usize,
    pub elevation: f64,
    pub limits: (f64, f64),
    pub colormap: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSummary {
    pub source: String,
    pub field: String,
    pub level: usize,
    pub limits: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub window_title: String,
    pub modes: Vec<ModeReport>,
    pub components: Vec<ComponentReport>,
    pub links: Vec<LinkReport>,
    pub current_file: Option<String>,
    pub radar: Option<RadarSummary>,
    pub grid: Option<GridSummary>,
    /// Linked rows shown by the inspector, when one was added.
    pub inspector_rows: Option<usize>,
}

impl Report {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.window_title)?;
        for mode in &self.modes {
            writeln!(
                f,
                "mode {}: {} reused, {} created, {} rebound",
                mode.name, mode.reused, mode.created, mode.rebound
            )?;
        }
        writeln!(f, "components:")?;
        for c in &self.components {
            writeln!(f, "  {} ({}) [{}]", c.name, c.type_name, c.shared.join(", "))?;
        }
        writeln!(f, "links:")?;
        for link in &self.links {
            writeln!(f, "  {}: {}", link.cell, link.members.join(" <-> "))?;
        }
        if let Some(path) = &self.current_file {
            writeln!(f, "file: {path}")?;
        }
        if let Some(r) = &self.radar {
            writeln!(
                f,
                "radar: {} tilt {} ({:.1} deg) limits {:?} {}",
                r.field, r.tilt, r.elevation, r.limits, r.colormap
            )?;
        }
        if let Some(g) = &self.grid {
            writeln!(f, "grid: {} level {} limits {:?}", g.field, g.level, g.limits)?;
        }
        if let Some(rows) = self.inspector_rows {
            writeln!(f, "inspector: {rows} linked rows")?;
        }
        Ok(())
    }
}

/// Build the context and install the synthetic data services.
#[must_use]
pub fn context_for(config: &ArtviewConfig) -> AppContext {
    let ctx = AppContext::new(config.clone());
    ctx.set_main_window(Some(WindowHandle::new(MAIN_WINDOW_ID, &config.window_title)));
    ctx.provide::<Rc<dyn DatasetLoader>>(Rc::new(SyntheticLoader::new()));
    ctx.provide::<Rc<dyn Gridder>>(Rc::new(SyntheticGridder));
    ctx
}

/// The first registered panel of type `C`.
fn find<C: Component>(ctx: &AppContext) -> Option<Rc<C>> {
    ctx.registry().snapshot().into_iter().find_map(downcast_rc::<C>)
}

fn require<C: ComponentFactory>(ctx: &AppContext) -> Result<Rc<C>, SessionError> {
    find::<C>(ctx).ok_or(SessionError::NoPanel(C::TYPE_NAME))
}

/// Run `plan` against a fresh context configured by `config`.
pub fn run(config: &ArtviewConfig, plan: &SessionPlan) -> Result<Report, SessionError> {
    let span = info_span!("session", title = %config.window_title);
    let _guard = span.enter();

    let ctx = context_for(config);
    let components = component_catalog();
    let catalog = modes_for(config);

    let inspector = if plan.inspect {
        let spec = ComponentSpec::named(LinkInspector::TYPE_NAME).with_parent(ctx.main_window());
        Some(LinkInspector::create(&ctx, spec)?)
    } else {
        None
    };

    let mut modes = Vec::with_capacity(plan.modes.len());
    for name in &plan.modes {
        let spec = catalog.resolve(name, &components)?;
        let assembly = change_mode(&ctx, &spec)?;
        modes.push(ModeReport {
            name: name.clone(),
            reused: assembly.reused.len(),
            created: assembly.created.len(),
            rebound: assembly.rebound(),
        });
    }

    if !plan.open.is_empty() {
        let menu = require::<Menu>(&ctx)?;
        for path in &plan.open {
            let kind = menu.open(path)?;
            info!(path = %path, ?kind, "opened");
        }
    }
    if plan.steps > 0 {
        let navigator = require::<FileNavigator>(&ctx)?;
        for _ in 0..plan.steps {
            navigator.next()?;
        }
    }
    if plan.grid {
        require::<Mapper>(&ctx)?.execute()?;
    }

    let inspector_rows = inspector.map(|inspector| {
        inspector.refresh();
        inspector.linked_rows().len()
    });

    Ok(Report {
        window_title: config.window_title.clone(),
        modes,
        components: component_reports(&ctx),
        links: link_reports(&ctx),
        current_file: find::<Menu>(&ctx).and_then(|menu| menu.current_path()),
        radar: find::<RadarDisplay>(&ctx)
            .and_then(|display| display.frame())
            .map(|frame| RadarSummary {
                path: frame.path,
                field: frame.field,
                tilt: frame.tilt,
                elevation: frame.elevation,
                limits: frame.limits,
                colormap: frame.colormap,
            }),
        grid: find::<GridDisplay>(&ctx)
            .and_then(|display| display.frame())
            .map(|frame| GridSummary {
                source: frame.source,
                field: frame.field,
                level: frame.level,
                limits: frame.limits,
            }),
        inspector_rows,
    })
}

fn component_reports(ctx: &AppContext) -> Vec<ComponentReport> {
    ctx.registry()
        .snapshot()
        .iter()
        .map(|c| ComponentReport {
            name: c.name().to_owned(),
            type_name: c.type_name().to_owned(),
            shared: c.host().shared_names(),
        })
        .collect()
}

fn link_reports(ctx: &AppContext) -> Vec<LinkReport> {
    let registry = ctx.registry();
    linked_groups(registry)
        .into_iter()
        .filter(|group| group.is_linked())
        .map(|group| LinkReport {
            cell: group.cell_name,
            members: group
                .members
                .into_iter()
                .map(|(_, name)| name)
                .collect(),
        })
        .collect()
}
