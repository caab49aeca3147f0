use crate::core::geo::LatLng;
use crate::data::trip::ChargeStation;
use crate::prelude::HashMap;

/// An info popup anchored at a position, holding HTML content
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub id: String,
    pub position: LatLng,
    pub content: String,
    pub visible: bool,
}

impl Popup {
    pub fn new(id: String, position: LatLng, content: String) -> Self {
        Self {
            id,
            position,
            content,
            visible: false,
        }
    }

    /// Popup listing a charge station's details, followed by any trip
    /// statistics for that stop
    pub fn for_station(id: String, station: &ChargeStation, details: &[(&str, &str)]) -> Self {
        Self::new(id, station.coord(), station_content(station, details))
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

/// HTML body of a station popup
pub fn station_content(station: &ChargeStation, details: &[(&str, &str)]) -> String {
    let mut html = String::from("<div class=\"station-popup\">");
    html.push_str(&format!("<h3>{}</h3>", escape_html(station.name())));
    html.push_str(&format!("<p>{}</p>", escape_html(station.address())));
    html.push_str(&format!("<p>Hours: {}</p>", escape_html(station.hours())));
    html.push_str(&format!("<p>Phone: {}</p>", escape_html(station.phone())));
    html.push_str(&format!(
        "<p>Open date: {}</p>",
        escape_html(station.open_date())
    ));

    if !details.is_empty() {
        html.push_str("<ul>");
        for (label, value) in details {
            html.push_str(&format!(
                "<li>{}: {}</li>",
                escape_html(label),
                escape_html(value)
            ));
        }
        html.push_str("</ul>");
    }

    html.push_str("</div>");
    html
}

/// Escapes the characters that are significant in HTML text and attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Open/closed state of the popups on a map
#[derive(Debug, Default)]
pub struct PopupManager {
    popups: HashMap<String, Popup>,
}

impl PopupManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_popup(&mut self, popup: Popup) {
        self.popups.insert(popup.id.clone(), popup);
    }

    pub fn get(&self, id: &str) -> Option<&Popup> {
        self.popups.get(id)
    }

    pub fn show_popup(&mut self, id: &str) -> bool {
        match self.popups.get_mut(id) {
            Some(popup) => {
                popup.show();
                true
            }
            None => false,
        }
    }

    pub fn hide_popup(&mut self, id: &str) {
        if let Some(popup) = self.popups.get_mut(id) {
            popup.hide();
        }
    }

    pub fn len(&self) -> usize {
        self.popups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.popups.is_empty()
    }

    pub fn visible_count(&self) -> usize {
        self.popups.values().filter(|p| p.visible).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station() -> ChargeStation {
        ChargeStation {
            lat: 44.0,
            lng: -79.0,
            name: Some("Barrie Supercharger".into()),
            address: Some("34 Commerce Park Dr".into()),
            hours: Some("24 hours daily".into()),
            phone: None,
            open_date: Some("June 1 2016".into()),
        }
    }

    #[test]
    fn test_station_content_lists_fields() {
        let content = station_content(&station(), &[("Charge time", "10 mins 0 secs")]);
        assert!(content.contains("Barrie Supercharger"));
        assert!(content.contains("34 Commerce Park Dr"));
        assert!(content.contains("24 hours daily"));
        assert!(content.contains("Phone: not available"));
        assert!(content.contains("June 1 2016"));
        assert!(content.contains("<li>Charge time: 10 mins 0 secs</li>"));
    }

    #[test]
    fn test_content_is_escaped() {
        let mut s = station();
        s.name = Some("<b>A&W</b>".into());
        let content = station_content(&s, &[]);
        assert!(content.contains("&lt;b&gt;A&amp;W&lt;/b&gt;"));
        assert!(!content.contains("<ul>"));
    }

    #[test]
    fn test_popup_manager_visibility() {
        let mut manager = PopupManager::new();
        manager.add_popup(Popup::for_station("leg-0".into(), &station(), &[]));
        assert_eq!(manager.visible_count(), 0);

        assert!(manager.show_popup("leg-0"));
        assert!(!manager.show_popup("missing"));
        assert_eq!(manager.visible_count(), 1);
        assert_eq!(manager.get("leg-0").unwrap().position, LatLng::new(44.0, -79.0));

        manager.hide_popup("leg-0");
        assert_eq!(manager.visible_count(), 0);
        assert_eq!(manager.len(), 1);
    }
}
