use rankwatch_core::model::{COUNTRIES, DEFAULT_COUNTRY, NewProject, parse_keywords};
use rankwatch_lookup::Device;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Domain,
    Keywords,
    Device,
    Country,
    City,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Name,
        FormField::Domain,
        FormField::Keywords,
        FormField::Device,
        FormField::Country,
        FormField::City,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Project Name",
            FormField::Domain => "Domain",
            FormField::Keywords => "Keywords (one per line)",
            FormField::Device => "Device",
            FormField::Country => "Country",
            FormField::City => "City (optional)",
        }
    }

    fn position(&self) -> usize {
        Self::ALL.iter().position(|f| f == self).unwrap_or(0)
    }
}

/// State of the "new project" modal.
#[derive(Debug, Clone)]
pub struct ProjectForm {
    pub name: String,
    pub domain: String,
    pub keywords: String,
    pub device: Device,
    pub country_index: usize,
    pub city: String,
    pub focus: FormField,
    pub error: Option<String>,
}

impl Default for ProjectForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            domain: String::new(),
            keywords: String::new(),
            device: Device::Desktop,
            country_index: COUNTRIES
                .iter()
                .position(|c| *c == DEFAULT_COUNTRY)
                .unwrap_or(0),
            city: String::new(),
            focus: FormField::Name,
            error: None,
        }
    }
}

impl ProjectForm {
    pub fn country(&self) -> &'static str {
        COUNTRIES[self.country_index % COUNTRIES.len()]
    }

    pub fn focus_next(&mut self) {
        let next = (self.focus.position() + 1) % FormField::ALL.len();
        self.focus = FormField::ALL[next];
    }

    pub fn focus_prev(&mut self) {
        let len = FormField::ALL.len();
        let prev = (self.focus.position() + len - 1) % len;
        self.focus = FormField::ALL[prev];
    }

    /// Left/Right on a choice field.
    pub fn cycle(&mut self, forward: bool) {
        match self.focus {
            FormField::Device => {
                self.device = match self.device {
                    Device::Desktop => Device::Mobile,
                    Device::Mobile => Device::Desktop,
                };
            }
            FormField::Country => {
                let len = COUNTRIES.len();
                self.country_index = if forward {
                    (self.country_index + 1) % len
                } else {
                    (self.country_index + len - 1) % len
                };
            }
            _ => {}
        }
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Name => Some(&mut self.name),
            FormField::Domain => Some(&mut self.domain),
            FormField::Keywords => Some(&mut self.keywords),
            FormField::City => Some(&mut self.city),
            FormField::Device | FormField::Country => None,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        match self.text_mut() {
            Some(text) => text.push(c),
            None if c == ' ' => self.cycle(true),
            None => {}
        }
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.text_mut() {
            text.pop();
        }
    }

    pub fn newline(&mut self) {
        if self.focus == FormField::Keywords {
            self.keywords.push('\n');
        }
    }

    pub fn keyword_count(&self) -> usize {
        parse_keywords(&self.keywords).len()
    }

    pub fn to_new_project(&self) -> NewProject {
        let city = self.city.trim();
        NewProject {
            name: self.name.clone(),
            domain: self.domain.clone(),
            keywords: parse_keywords(&self.keywords),
            device: self.device,
            country: self.country().to_string(),
            city: if city.is_empty() {
                None
            } else {
                Some(city.to_string())
            },
        }
    }
}
