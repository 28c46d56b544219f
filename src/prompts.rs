use handlebars::Handlebars;
use serde_json::json;

use crate::catalog::Weather;

/// Net calorie distance from zero still considered a balanced day.
pub const BALANCED_BAND_KCAL: f64 = 200.0;

const RECOMMENDATION_SURPLUS: &str = "My net calorie intake for today is {{net_calories}}, which is a surplus. \
Give me a short, encouraging, and actionable tip for tomorrow to get back on track. \
Keep it under 50 words. Address me directly.";

const RECOMMENDATION_DEFICIT: &str = "My net calorie intake for today is {{net_calories}}, which is a significant deficit. \
Give me a short, encouraging, and positive reinforcement message. \
Keep it under 50 words. Address me directly.";

const RECOMMENDATION_BALANCED: &str = "My net calorie intake for today is {{net_calories}}, which is within my target range. \
Give me a short, encouraging message congratulating me on my balanced day. \
Keep it under 50 words. Address me directly.";

const MEAL_IDEA: &str = "You are a creative chef. Generate a meal idea with approximately {{calorie_target}} calories. \
The meal should be healthy and easy to prepare. \
Reply with a single JSON object and nothing else, using the keys \
\"name\" (string), \"description\" (a short, enticing description) and \"calories\" (number, estimated calories).";

const OUTDOOR_ACTIVITY: &str = "You are a helpful assistant who loves the outdoors. \
The weather is currently {{weather}} and the temperature is {{temperature}}°C. \
Suggest a fun and safe outdoor activity suitable for these conditions. Be creative and encouraging. \
Reply with a single JSON object and nothing else, using the keys \
\"activity\" (string) and \"reason\" (a short reason why it suits the weather).";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Surplus,
    Deficit,
    Balanced,
}

impl Tone {
    pub fn from_net_calories(net_calories: f64) -> Self {
        if net_calories > BALANCED_BAND_KCAL {
            Tone::Surplus
        } else if net_calories < -BALANCED_BAND_KCAL {
            Tone::Deficit
        } else {
            Tone::Balanced
        }
    }

    fn template(self) -> &'static str {
        match self {
            Tone::Surplus => "recommendation_surplus",
            Tone::Deficit => "recommendation_deficit",
            Tone::Balanced => "recommendation_balanced",
        }
    }
}

/// Renders the prompts sent to the text generator.
pub struct Prompts {
    registry: Handlebars<'static>,
}

impl Prompts {
    pub fn new() -> Result<Self, handlebars::TemplateError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_template_string("recommendation_surplus", RECOMMENDATION_SURPLUS)?;
        registry.register_template_string("recommendation_deficit", RECOMMENDATION_DEFICIT)?;
        registry.register_template_string("recommendation_balanced", RECOMMENDATION_BALANCED)?;
        registry.register_template_string("meal_idea", MEAL_IDEA)?;
        registry.register_template_string("outdoor_activity", OUTDOOR_ACTIVITY)?;
        Ok(Self { registry })
    }

    pub fn recommendation(&self, net_calories: f64) -> Result<String, handlebars::RenderError> {
        let tone = Tone::from_net_calories(net_calories);
        self.registry.render(
            tone.template(),
            &json!({ "net_calories": net_calories.round() as i64 }),
        )
    }

    pub fn meal_idea(&self, calorie_target: u32) -> Result<String, handlebars::RenderError> {
        self.registry
            .render("meal_idea", &json!({ "calorie_target": calorie_target }))
    }

    pub fn outdoor_activity(
        &self,
        weather: Weather,
        temperature_c: i32,
    ) -> Result<String, handlebars::RenderError> {
        self.registry.render(
            "outdoor_activity",
            &json!({ "weather": weather.as_str(), "temperature": temperature_c }),
        )
    }
}
