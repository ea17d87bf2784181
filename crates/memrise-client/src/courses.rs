use crate::schema::{CourseListing, DashboardCourses, EditingHtml, LevelListing};
use crate::MemriseClient;
use memrise_model::{Course, CourseSummary, Error, Level, Result, Word};

/// Page size of the dashboard course listing.
const PAGE_SIZE: usize = 8;

impl MemriseClient {
    /// Courses the logged-in user can edit ("teaching" courses).
    pub async fn courses(&self) -> Result<Vec<CourseSummary>> {
        let mut all = Vec::new();
        let mut offset = 0;

        loop {
            let page: DashboardCourses = self
                .get_json(
                    "/v1.21/dashboard/courses/",
                    &[
                        ("filter", "teaching".to_string()),
                        ("offset", offset.to_string()),
                        ("limit", PAGE_SIZE.to_string()),
                    ],
                )
                .await?;

            let count = page.courses.len();
            all.extend(page.courses.into_iter().map(|c| CourseSummary {
                id: c.id,
                name: c.name,
            }));
            tracing::debug!(offset, count, more = page.has_more_pages, "Fetched course page");

            if !page.has_more_pages || count == 0 {
                break;
            }
            offset += count;
        }

        tracing::info!(courses = all.len(), "Fetched teaching courses");
        Ok(all)
    }

    /// Fetch a course and its ordered levels. Levels come back without words.
    pub async fn course(&self, course_id: u64) -> Result<Course> {
        let listing: CourseListing = self
            .get_json(&format!("/v1.21/courses/{course_id}/"), &[])
            .await?;
        let schema = listing
            .courses
            .into_iter()
            .next()
            .ok_or_else(|| Error::Parse(format!("course {course_id} missing from response")))?;

        let levels: LevelListing = self
            .get_json(&format!("/v1.21/courses/{course_id}/levels/"), &[])
            .await?;

        let mut levels: Vec<Level> = levels
            .levels
            .into_iter()
            .map(|l| Level {
                id: l.id,
                index: l.index,
                title: l.title,
                words: Vec::new(),
            })
            .collect();
        levels.sort_by_key(|l| l.index);

        let course = Course {
            id: schema.id,
            name: schema.name,
            target_language: schema.target.and_then(|t| t.language_code),
            levels,
        };
        tracing::info!(
            course = %course.name,
            levels = course.levels.len(),
            lang = ?course.target_language,
            "Fetched course"
        );
        Ok(course)
    }

    /// Scrape the words of one level from its editing table.
    pub async fn level_words(&self, level_id: u64) -> Result<Vec<Word>> {
        let editing: EditingHtml = self
            .get_json(
                "/ajax/level/editing_html/",
                &[("level_id", level_id.to_string())],
            )
            .await?;
        tracing::debug!(level_id, bytes = editing.rendered.len(), "Received level HTML");

        memrise_parse::parse_level_words(&editing.rendered)
    }
}
