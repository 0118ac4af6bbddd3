//! Plates and pages.
//!
//! A plate is one display: its pages, the widgets on them and the rules that
//! drive them. Widget ids come from one counter per plate, starting at 1 and
//! shared by all pages; an id is never reassigned.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::automation::{Automation, BindingEntry, Rule};
use crate::color::Color;
use crate::error::{PlateError, Result};
use crate::layout::{Grid, GridLayout, Placement};
use crate::styling::{Font, StyleEntry};
use crate::theme::Theme;
use crate::validation::{ValidationReport, Validator};
use crate::widgets::{Address, Widget};

/// Title node injected ahead of a page's first widget. It has no id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMarker {
    #[serde(skip_serializing_if = "is_first_page")]
    pub page: usize,
    pub comment: String,
}

fn is_first_page(page: &usize) -> bool {
    *page == 0
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Marker(PageMarker),
    Widget(Widget),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    number: usize,
    title: String,
    grid: Grid,
    nodes: Vec<Node>,
}

impl Page {
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn widgets(&self) -> impl Iterator<Item = &Widget> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Widget(widget) => Some(widget),
            Node::Marker(_) => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Plate {
    pub name: String,
    pub width: u32,
    pub height: u32,
    theme: Option<Theme>,
    text_font: Option<Font>,
    text_color: Option<Color>,
    pages: Vec<Page>,
    automations: Vec<Automation>,
    last_id: u32,
}

impl Plate {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            theme: None,
            text_font: None,
            text_color: None,
            pages: vec![],
            automations: vec![],
            last_id: 0,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = Some(theme);
    }

    pub fn theme(&self) -> Option<&Theme> {
        self.theme.as_ref()
    }

    /// Font and text color given to every widget added from now on.
    pub fn set_font(&mut self, font: impl Into<Font>, color: Color) {
        self.text_font = Some(font.into());
        self.text_color = Some(color);
    }

    /// Appends a page; following `add` calls place widgets on it.
    ///
    /// Returns the page number.
    pub fn page(&mut self, layout: GridLayout, title: impl Into<String>) -> Result<usize> {
        let number = self.pages.len();
        let title = title.into();
        let grid = layout.bind(self.width, self.height)?;

        debug!(
            plate = %self.name,
            page = number,
            cell_width = grid.cell_width(),
            cell_height = grid.cell_height(),
            "page added"
        );

        self.pages.push(Page {
            number,
            title,
            grid,
            nodes: vec![],
        });
        Ok(number)
    }

    /// Places `widget` on the current (last) page and assigns its id.
    ///
    /// The plate's default font and color are appended as style overrides.
    /// Returns the widget as stored so bindings can still be attached.
    pub fn add(&mut self, mut widget: Widget, placement: Placement) -> Result<&mut Widget> {
        if let Some(font) = &self.text_font {
            widget.styles_mut().set(StyleEntry::new().text_font(font.clone()));
        }
        if let Some(color) = self.text_color {
            widget.styles_mut().set(StyleEntry::new().text_color(color));
        }

        let page = self
            .pages
            .last_mut()
            .ok_or_else(|| PlateError::NoPage(self.name.clone()))?;

        if let Some(rect) = page.grid.place(&placement) {
            widget.fields.x = rect.x;
            widget.fields.y = rect.y;
            widget.fields.w = rect.w;
            widget.fields.h = rect.h;
        }

        // pages without widgets emit nothing, not even their title
        if page.nodes.is_empty() {
            page.nodes.push(Node::Marker(PageMarker {
                page: page.number,
                comment: page.title.clone(),
            }));
        }

        self.last_id += 1;
        widget.attach(page.number, self.last_id);

        debug!(
            plate = %self.name,
            page = page.number,
            id = self.last_id,
            obj = widget.tag(),
            "widget added"
        );

        page.nodes.push(Node::Widget(widget));
        match page.nodes.last_mut() {
            Some(Node::Widget(widget)) => Ok(widget),
            _ => Err(PlateError::NoPage(self.name.clone())),
        }
    }

    /// Like [`add`](Self::add), returning only the new widget's address.
    pub fn place(&mut self, widget: impl Into<Widget>, placement: Placement) -> Result<Address> {
        self.add(widget.into(), placement)?;
        Ok(Address {
            page: self.pages.len() - 1,
            id: self.last_id,
        })
    }

    pub fn add_automation(&mut self, automation: impl Into<Automation>) {
        self.automations.push(automation.into());
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn automations(&self) -> &[Automation] {
        &self.automations
    }

    /// All widgets in insertion order across pages.
    pub fn widgets(&self) -> impl Iterator<Item = &Widget> {
        self.pages.iter().flat_map(Page::widgets)
    }

    pub fn widget(&self, id: u32) -> Option<&Widget> {
        self.widgets().find(|w| w.id() == Some(id))
    }

    pub fn widget_mut(&mut self, id: u32) -> Option<&mut Widget> {
        self.pages
            .iter_mut()
            .flat_map(|page| page.nodes.iter_mut())
            .find_map(|node| match node {
                Node::Widget(widget) if widget.id() == Some(id) => Some(widget),
                _ => None,
            })
    }

    /// Every device document of the plate, in insertion order.
    pub fn documents(&self) -> Result<Vec<Value>> {
        let theme = self.theme.as_ref();
        let mut documents = vec![];
        for page in &self.pages {
            for node in &page.nodes {
                match node {
                    Node::Marker(marker) => documents.push(serde_json::to_value(marker)?),
                    Node::Widget(widget) => documents.extend(widget.documents(theme)?),
                }
            }
        }
        Ok(documents)
    }

    /// One JSON document per line.
    pub fn jsonl(&self) -> Result<String> {
        let lines = self
            .documents()?
            .iter()
            .map(serde_json::to_string)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(lines.join("\n"))
    }

    /// Bindings of the widgets that have one.
    pub fn bindings(&self) -> Vec<BindingEntry> {
        self.widgets()
            .filter_map(|widget| Some(widget.binding()?.entry(widget.address()?)))
            .collect()
    }

    pub fn rules(&self) -> Vec<Rule> {
        self.automations
            .iter()
            .flat_map(|automation| automation.rules(&self.name))
            .collect()
    }

    pub fn validate(&self) -> ValidationReport {
        Validator::new().validate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::{Label, Tab, TabView};
    use serde_json::json;

    fn plate() -> Plate {
        let mut plate = Plate::new("office", 240, 320);
        plate.page(GridLayout::new(12, 16), "Page Zero").unwrap();
        plate
    }

    #[test]
    fn test_ids_start_at_one_and_span_pages() {
        let mut plate = plate();
        let a = plate.add(Label::new("a").into(), Placement::none()).unwrap().id();
        plate.page(GridLayout::new(12, 16), "Page One").unwrap();
        let b = plate.add(Label::new("b").into(), Placement::none()).unwrap().id();
        assert_eq!((a, b), (Some(1), Some(2)));
        assert_eq!(plate.widget(2).unwrap().page(), Some(1));
    }

    #[test]
    fn test_place_returns_address() {
        let mut plate = plate();
        plate.page(GridLayout::new(12, 16), "Page One").unwrap();
        let addr = plate.place(Label::new("a"), Placement::none()).unwrap();
        assert_eq!(addr.to_string(), "p1b1");
    }

    #[test]
    fn test_add_without_page_fails() {
        let mut plate = Plate::new("empty", 100, 100);
        assert!(matches!(
            plate.add(Widget::container(), Placement::none()),
            Err(PlateError::NoPage(_))
        ));
    }

    #[test]
    fn test_marker_precedes_first_widget() {
        let mut plate = plate();
        plate.page(GridLayout::new(12, 16), "Page One").unwrap();
        plate.add(Label::new("x").into(), Placement::grid(0.0, 0.0, 1.0, 1.0)).unwrap();
        plate.add(Label::new("y").into(), Placement::none()).unwrap();

        let docs = plate.documents().unwrap();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0], json!({"page": 1, "comment": "Page One"}));
        assert_eq!(docs[1]["id"], 1);
        assert_eq!(docs[1]["w"], 20);
        assert_eq!(docs[2]["id"], 2);
    }

    #[test]
    fn test_empty_page_emits_nothing() {
        let mut plate = plate();
        assert!(plate.documents().unwrap().is_empty());

        plate.add(Label::new("x").into(), Placement::none()).unwrap();
        assert_eq!(plate.documents().unwrap()[0], json!({"comment": "Page Zero"}));
    }

    #[test]
    fn test_unplaced_widget_keeps_zero_geometry() {
        let mut plate = plate();
        let tabs = plate.add(TabView::default().into(), Placement::none()).unwrap();
        assert_eq!((tabs.fields.x, tabs.fields.w), (0, 0));
        assert_eq!(tabs.id(), Some(1));
    }

    #[test]
    fn test_default_font_applied_after_own_styles() {
        let mut plate = plate();
        plate.set_font("md_24", Color::new(255, 255, 255));
        let tab = Tab::new("home");
        let widget = Widget::from(tab).style(StyleEntry::new().text_font(12));
        plate.add(widget, Placement::none()).unwrap();

        let docs = plate.documents().unwrap();
        assert_eq!(docs[1]["text_font"], "md_24");
        assert_eq!(docs[1]["text_color"], "#ffffff");
    }

    #[test]
    fn test_jsonl_lines() {
        let mut plate = plate();
        plate.add(Label::new("a").into(), Placement::none()).unwrap();
        let jsonl = plate.jsonl().unwrap();
        assert_eq!(jsonl.lines().count(), 2);
        assert!(!jsonl.ends_with('\n'));
    }

    #[test]
    fn test_bindings_only_for_bound_widgets() {
        let mut plate = plate();
        plate.add(Label::new("a").into(), Placement::none()).unwrap();
        plate
            .add(Label::new("b").into(), Placement::none())
            .unwrap()
            .binding_mut()
            .inherit_value_from_template("text", "{{ states('sensor.t') }}");

        let bindings = plate.bindings();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].obj, "p0b2");
    }

    #[test]
    fn test_validate_reports_every_violation() {
        let mut plate = plate();
        let mut label: Widget = Label::new("a").into();
        label.fields.ext_click_h = Some(300);
        plate.add(label, Placement::none()).unwrap();
        plate.add(Widget::container().parent(99), Placement::none()).unwrap();

        let report = plate.validate();
        assert!(!report.valid);
        assert_eq!(report.violations.len(), 2);
    }
}
