use anyhow::{Context, Result, anyhow};
use game_types::{Clue, ClueId, CluePrompt, PublicBoard, PublicCategory, PublicClueSlot};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// One clue as written in a board file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClueSpec {
    #[serde(default)]
    pub question: String,
    pub answer: String,
    pub value: i32,
    #[serde(default)]
    pub is_daily_double: bool,
    #[serde(default)]
    pub is_image: bool,
    #[serde(default)]
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySpec {
    pub name: String,
    pub clues: Vec<ClueSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalRoundSpec {
    pub category: String,
    #[serde(default)]
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub is_image: bool,
    #[serde(default)]
    pub image_path: Option<String>,
}

/// On-disk board layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardFile {
    pub categories: Vec<CategorySpec>,
    pub final_round: FinalRoundSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub clues: Vec<Clue>,
}

/// The clue set for one game instance: regular categories plus exactly one final clue.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    categories: Vec<Category>,
    final_clue: Clue,
}

impl Board {
    /// Load a board from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read board file {}", path.display()))?;
        Self::from_json_str(&contents)
            .with_context(|| format!("Invalid board file {}", path.display()))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: BoardFile = serde_json::from_str(json)?;
        Self::from_spec(file)
    }

    /// Build a board, assigning clue ids in category order.
    pub fn from_spec(file: BoardFile) -> Result<Self> {
        if file.categories.is_empty() {
            return Err(anyhow!("Board has no categories"));
        }

        let mut next_id: ClueId = 1;
        let mut categories = Vec::with_capacity(file.categories.len());

        for category in file.categories {
            let mut clues = Vec::with_capacity(category.clues.len());
            for spec in category.clues {
                if spec.value < 0 {
                    return Err(anyhow!(
                        "Clue in '{}' has negative value {}",
                        category.name,
                        spec.value
                    ));
                }
                let prompt = prompt_from(&spec.question, spec.is_image, spec.image_path.as_deref())
                    .with_context(|| format!("Clue {} in '{}'", next_id, category.name))?;
                let canonical_answer = required_answer(&spec.answer)
                    .with_context(|| format!("Clue {} in '{}'", next_id, category.name))?;

                clues.push(Clue {
                    id: next_id,
                    category: category.name.clone(),
                    prompt,
                    canonical_answer,
                    face_value: spec.value,
                    is_wager_clue: spec.is_daily_double,
                });
                next_id += 1;
            }
            categories.push(Category {
                name: category.name,
                clues,
            });
        }

        let final_spec = file.final_round;
        let final_clue = Clue {
            id: next_id,
            prompt: prompt_from(
                &final_spec.question,
                final_spec.is_image,
                final_spec.image_path.as_deref(),
            )
            .context("Final round clue")?,
            canonical_answer: required_answer(&final_spec.answer).context("Final round clue")?,
            category: final_spec.category,
            face_value: 0,
            is_wager_clue: true,
        };

        Ok(Self {
            categories,
            final_clue,
        })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn final_clue(&self) -> &Clue {
        &self.final_clue
    }

    /// Regular clues in board order
    pub fn clues(&self) -> impl Iterator<Item = &Clue> {
        self.categories.iter().flat_map(|category| category.clues.iter())
    }

    pub fn clue(&self, clue_id: ClueId) -> Option<&Clue> {
        self.clues().find(|clue| clue.id == clue_id)
    }

    pub fn total_clues(&self) -> usize {
        self.categories.iter().map(|category| category.clues.len()).sum()
    }

    pub fn daily_double_count(&self) -> usize {
        self.clues().filter(|clue| clue.is_wager_clue).count()
    }

    /// Board as shown to players, with answered slots marked and no answers revealed.
    pub fn public_view(&self, answered: &HashSet<ClueId>) -> PublicBoard {
        PublicBoard {
            categories: self
                .categories
                .iter()
                .map(|category| PublicCategory {
                    name: category.name.clone(),
                    clues: category
                        .clues
                        .iter()
                        .map(|clue| PublicClueSlot {
                            id: clue.id,
                            face_value: clue.face_value,
                            answered: answered.contains(&clue.id),
                        })
                        .collect(),
                })
                .collect(),
            final_category: self.final_clue.category.clone(),
        }
    }
}

fn prompt_from(question: &str, is_image: bool, image_path: Option<&str>) -> Result<CluePrompt> {
    if is_image {
        let path = image_path
            .filter(|path| !path.trim().is_empty())
            .ok_or_else(|| anyhow!("Image clue is missing an image path"))?;
        Ok(CluePrompt::Image {
            path: path.to_string(),
        })
    } else if question.trim().is_empty() {
        Err(anyhow!("Text clue has an empty question"))
    } else {
        Ok(CluePrompt::Text {
            text: question.to_string(),
        })
    }
}

fn required_answer(answer: &str) -> Result<String> {
    if crate::AnswerMatcher::is_blank(answer) {
        return Err(anyhow!("Canonical answer is empty"));
    }
    Ok(answer.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "categories": [
            {
                "name": "Hometowns",
                "clues": [
                    { "question": "Blue Ridge city on the James River", "answer": "What is Lynchburg?", "value": 200 },
                    { "question": "Go Blue", "answer": "What is Ann Arbor?", "value": 800, "is_daily_double": true }
                ]
            },
            {
                "name": "Rebus",
                "clues": [
                    { "answer": "What is label?", "value": 200, "is_image": true, "image_path": "/image1.png" }
                ]
            }
        ],
        "final_round": {
            "category": "Computers",
            "question": "Armonk-based maker of mainframes",
            "answer": "What is IBM?"
        }
    }"#;

    #[test]
    fn test_board_from_json() {
        let board = Board::from_json_str(SAMPLE).unwrap();

        assert_eq!(board.categories().len(), 2);
        assert_eq!(board.total_clues(), 3);
        assert_eq!(board.daily_double_count(), 1);

        let ids: Vec<ClueId> = board.clues().map(|clue| clue.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(board.final_clue().id, 4);
        assert_eq!(board.final_clue().category, "Computers");

        let rebus = board.clue(3).unwrap();
        assert!(rebus.is_image_clue());
        assert_eq!(rebus.category, "Rebus");
        assert!(board.clue(2).unwrap().is_wager_clue);
        assert!(board.clue(99).is_none());
    }

    #[test]
    fn test_public_view_hides_answers() {
        let board = Board::from_json_str(SAMPLE).unwrap();
        let answered: HashSet<ClueId> = [1].into_iter().collect();

        let view = board.public_view(&answered);
        assert_eq!(view.final_category, "Computers");
        assert!(view.categories[0].clues[0].answered);
        assert!(!view.categories[0].clues[1].answered);

        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("Lynchburg"));
        assert!(!json.contains("IBM"));
    }

    #[test]
    fn test_board_validation() {
        let no_categories = r#"{ "categories": [], "final_round": { "category": "C", "question": "Q", "answer": "A" } }"#;
        assert!(Board::from_json_str(no_categories).is_err());

        let negative = r#"{ "categories": [ { "name": "C", "clues": [ { "question": "Q", "answer": "A", "value": -5 } ] } ],
                            "final_round": { "category": "C", "question": "Q", "answer": "A" } }"#;
        assert!(Board::from_json_str(negative).is_err());

        let blank_answer = r#"{ "categories": [ { "name": "C", "clues": [ { "question": "Q", "answer": "What is ?", "value": 5 } ] } ],
                                "final_round": { "category": "C", "question": "Q", "answer": "A" } }"#;
        assert!(Board::from_json_str(blank_answer).is_err());

        let image_without_path = r#"{ "categories": [ { "name": "C", "clues": [ { "answer": "A", "value": 5, "is_image": true } ] } ],
                                      "final_round": { "category": "C", "question": "Q", "answer": "A" } }"#;
        assert!(Board::from_json_str(image_without_path).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Board::load("/definitely/not/a/board.json");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to read board file"));
    }
}
