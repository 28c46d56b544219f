//! Fixed suggestion lists and random picks from them.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
}

impl Weather {
    pub const ALL: [Weather; 4] = [
        Weather::Sunny,
        Weather::Cloudy,
        Weather::Rainy,
        Weather::Snowy,
    ];

    /// Preset temperature in Celsius shown alongside the condition.
    pub fn temperature_c(self) -> i32 {
        match self {
            Weather::Sunny => 25,
            Weather::Cloudy => 18,
            Weather::Rainy => 15,
            Weather::Snowy => -2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Weather::Sunny => "sunny",
            Weather::Cloudy => "cloudy",
            Weather::Rainy => "rainy",
            Weather::Snowy => "snowy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExerciseIdea {
    pub activity: &'static str,
    pub gif_url: &'static str,
}

pub const EXERCISE_IDEAS: &[ExerciseIdea] = &[
    ExerciseIdea { activity: "Jumping Jacks", gif_url: "/media/exercises/jumping-jacks.gif" },
    ExerciseIdea { activity: "Push-ups", gif_url: "/media/exercises/push-ups.gif" },
    ExerciseIdea { activity: "Squats", gif_url: "/media/exercises/squats.gif" },
    ExerciseIdea { activity: "Lunges", gif_url: "/media/exercises/lunges.gif" },
    ExerciseIdea { activity: "Plank", gif_url: "/media/exercises/plank.gif" },
    ExerciseIdea { activity: "Burpees", gif_url: "/media/exercises/burpees.gif" },
    ExerciseIdea { activity: "Mountain Climbers", gif_url: "/media/exercises/mountain-climbers.gif" },
    ExerciseIdea { activity: "High Knees", gif_url: "/media/exercises/high-knees.gif" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FoodImage {
    pub image_url: &'static str,
    pub hint: &'static str,
}

pub const FOOD_IMAGES: &[FoodImage] = &[
    FoodImage { image_url: "/media/food/salad-bowl.jpg", hint: "salad bowl" },
    FoodImage { image_url: "/media/food/fruit-plate.jpg", hint: "fruit plate" },
    FoodImage { image_url: "/media/food/oatmeal.jpg", hint: "oatmeal berries" },
    FoodImage { image_url: "/media/food/grilled-chicken.jpg", hint: "grilled chicken" },
    FoodImage { image_url: "/media/food/smoothie.jpg", hint: "green smoothie" },
    FoodImage { image_url: "/media/food/avocado-toast.jpg", hint: "avocado toast" },
];

/// Uniform pick from a non-empty list.
pub fn pick<'a, T, R: Rng + ?Sized>(items: &'a [T], rng: &mut R) -> Option<&'a T> {
    items.choose(rng)
}

pub fn random_weather<R: Rng + ?Sized>(rng: &mut R) -> Weather {
    // ALL is non-empty
    *pick(&Weather::ALL, rng).unwrap_or(&Weather::Sunny)
}

pub fn random_exercise<R: Rng + ?Sized>(rng: &mut R) -> Option<ExerciseIdea> {
    pick(EXERCISE_IDEAS, rng).copied()
}

pub fn random_food_image<R: Rng + ?Sized>(rng: &mut R) -> Option<FoodImage> {
    pick(FOOD_IMAGES, rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn picks_stay_inside_catalog() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let idea = random_exercise(&mut rng).unwrap();
            assert!(EXERCISE_IDEAS.contains(&idea));
            let image = random_food_image(&mut rng).unwrap();
            assert!(FOOD_IMAGES.contains(&image));
            assert!(Weather::ALL.contains(&random_weather(&mut rng)));
        }
    }

    #[test]
    fn pick_from_empty_is_none() {
        let mut rng = StdRng::seed_from_u64(1);
        let empty: [u8; 0] = [];
        assert!(pick(&empty, &mut rng).is_none());
    }

    #[test]
    fn weather_presets() {
        assert_eq!(Weather::Snowy.temperature_c(), -2);
        assert_eq!(serde_json::to_string(&Weather::Rainy).unwrap(), "\"rainy\"");
    }
}
