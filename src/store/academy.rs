use chrono::NaiveTime;
use tracing::{info, instrument};

use super::{Store, remove_by_id, validate_input};
use crate::auth::Role;
use crate::error::AppError;
use crate::ids;
use crate::models::{
    Announcement, Category, CategoryUpdate, ChallengeParameter, ClassPlan, NewAnnouncement,
    NewCategory, NewChallengeParameter, NewClassPlan, NewSchedule, NewTournament,
    NewTrainingPlan, Schedule, Tournament, TournamentStatus, TrainingPlan,
};

fn parse_clock(value: &str, field: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::Validation(format!("{} must be HH:MM, got '{}'", field, value)))
}

impl Store {
    #[instrument(skip_all, fields(name = %input.name))]
    pub fn add_category(&mut self, input: NewCategory) -> Result<Category, AppError> {
        info!("Creating category");
        validate_input(&input)?;

        if input.age_range.min > input.age_range.max {
            return Err(AppError::Validation(format!(
                "Age range {}-{} is inverted",
                input.age_range.min, input.age_range.max
            )));
        }
        if input.monthly_fee.is_sign_negative() {
            return Err(AppError::Validation(
                "Monthly fee cannot be negative".to_string(),
            ));
        }
        if let Some(coach_id) = &input.coach_id {
            self.require_user_with_role(coach_id, Role::Coach, "coach_id")?;
        }

        let id = match input.id {
            Some(id) => {
                let id = id.trim().to_string();
                if id.is_empty() {
                    return Err(AppError::Validation("Category id cannot be blank".to_string()));
                }
                if self.categories.iter().any(|c| c.id == id) {
                    return Err(AppError::Conflict(format!("Category {} already exists", id)));
                }
                self.ids.observe(&id)?;
                id
            }
            None => self.ids.next(ids::CATEGORY),
        };

        self.categories.push(Category {
            id: id.clone(),
            name: input.name,
            description: input.description,
            age_range: input.age_range,
            max_students: input.max_students,
            current_students: 0,
            monthly_fee: input.monthly_fee,
            coach_id: None,
        });

        if let Some(coach_id) = &input.coach_id {
            self.link_coach(&id, coach_id);
        }

        self.get_category(&id)
    }

    #[instrument(skip(self))]
    pub fn get_category(&self, id: &str) -> Result<Category, AppError> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Category", id))
    }

    /// Looks a category up by id first, then by case-insensitive name.
    pub fn find_category(&self, name_or_id: &str) -> Option<Category> {
        let wanted = name_or_id.trim();
        self.categories
            .iter()
            .find(|c| c.id == wanted)
            .or_else(|| {
                self.categories
                    .iter()
                    .find(|c| c.name.eq_ignore_ascii_case(wanted))
            })
            .cloned()
    }

    #[instrument(skip(self))]
    pub fn list_categories(&self) -> Vec<Category> {
        info!("Listing categories");
        self.categories.clone()
    }

    #[instrument(skip(self, update))]
    pub fn update_category(&mut self, id: &str, update: CategoryUpdate) -> Result<Category, AppError> {
        info!("Updating category");
        validate_input(&update)?;
        let current = self.get_category(id)?;

        if let Some(range) = update.age_range {
            if range.min > range.max {
                return Err(AppError::Validation(format!(
                    "Age range {}-{} is inverted",
                    range.min, range.max
                )));
            }
        }
        if let Some(max_students) = update.max_students {
            if max_students < current.current_students {
                return Err(AppError::Validation(format!(
                    "Capacity {} is below the {} students already enrolled",
                    max_students, current.current_students
                )));
            }
        }
        if update.monthly_fee.is_some_and(|fee| fee.is_sign_negative()) {
            return Err(AppError::Validation(
                "Monthly fee cannot be negative".to_string(),
            ));
        }

        let category = self
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::not_found("Category", id))?;

        if let Some(name) = update.name {
            category.name = name;
        }
        if let Some(description) = update.description {
            category.description = description;
        }
        if let Some(range) = update.age_range {
            category.age_range = range;
        }
        if let Some(max_students) = update.max_students {
            category.max_students = max_students;
        }
        if let Some(fee) = update.monthly_fee {
            category.monthly_fee = fee;
        }

        Ok(category.clone())
    }

    #[instrument(skip_all, fields(category_id = %input.category_id))]
    pub fn add_schedule(&mut self, input: NewSchedule) -> Result<Schedule, AppError> {
        info!("Creating schedule");
        validate_input(&input)?;

        let start_time = parse_clock(&input.start_time, "start_time")?;
        let end_time = parse_clock(&input.end_time, "end_time")?;
        if start_time >= end_time {
            return Err(AppError::Validation(
                "Schedule must end after it starts".to_string(),
            ));
        }

        self.require_category_ref(&input.category_id)?;
        self.require_user_with_role(&input.coach_id, Role::Coach, "coach_id")?;

        let schedule = Schedule {
            id: self.ids.next(ids::SCHEDULE),
            category_id: input.category_id,
            coach_id: input.coach_id,
            day_of_week: input.day_of_week,
            start_time,
            end_time,
            location: input.location,
        };
        self.schedules.push(schedule.clone());

        Ok(schedule)
    }

    #[instrument(skip(self))]
    pub fn list_schedules(&self, category_id: Option<&str>, coach_id: Option<&str>) -> Vec<Schedule> {
        info!("Listing schedules");
        let mut schedules: Vec<Schedule> = self
            .schedules
            .iter()
            .filter(|s| category_id.is_none_or(|c| s.category_id == c))
            .filter(|s| coach_id.is_none_or(|c| s.coach_id == c))
            .cloned()
            .collect();

        schedules.sort_by_key(|s| (s.day_of_week.num_days_from_monday(), s.start_time));
        schedules
    }

    /// Schedules that already carry attendance cannot be removed.
    #[instrument(skip(self))]
    pub fn delete_schedule(&mut self, id: &str) -> Result<Schedule, AppError> {
        info!("Deleting schedule");
        if self.attendances.iter().any(|a| a.schedule_id == id) {
            return Err(AppError::Integrity(format!(
                "Schedule {} has attendance records",
                id
            )));
        }

        remove_by_id(&mut self.schedules, id, "Schedule", |s| s.id.as_str())
    }

    #[instrument(skip_all, fields(category_id = %input.category_id))]
    pub fn add_training_plan(&mut self, input: NewTrainingPlan) -> Result<TrainingPlan, AppError> {
        info!("Creating training plan");
        validate_input(&input)?;

        if input.start_date > input.end_date {
            return Err(AppError::Validation(
                "Training plan ends before it starts".to_string(),
            ));
        }

        self.require_category_ref(&input.category_id)?;
        self.require_user_with_role(&input.coach_id, Role::Coach, "coach_id")?;

        let plan = TrainingPlan {
            id: self.ids.next(ids::TRAINING_PLAN),
            category_id: input.category_id,
            coach_id: input.coach_id,
            title: input.title,
            objectives: input.objectives,
            start_date: input.start_date,
            end_date: input.end_date,
            exercises: input.exercises,
        };
        info!(plan_id = %plan.id, total_minutes = plan.total_minutes(), "Training plan created");
        self.training_plans.push(plan.clone());

        Ok(plan)
    }

    pub fn list_training_plans(
        &self,
        category_id: Option<&str>,
        coach_id: Option<&str>,
    ) -> Vec<TrainingPlan> {
        self.training_plans
            .iter()
            .filter(|p| category_id.is_none_or(|c| p.category_id == c))
            .filter(|p| coach_id.is_none_or(|c| p.coach_id == c))
            .cloned()
            .collect()
    }

    #[instrument(skip(self))]
    pub fn delete_training_plan(&mut self, id: &str) -> Result<TrainingPlan, AppError> {
        info!("Deleting training plan");
        remove_by_id(&mut self.training_plans, id, "Training plan", |p| p.id.as_str())
    }

    /// The category may be given by name, as class plans are usually written against
    /// the category a coach sees on screen. It is stored by id.
    #[instrument(skip_all, fields(category = %input.category))]
    pub fn add_class_plan(&mut self, input: NewClassPlan) -> Result<ClassPlan, AppError> {
        info!("Creating class plan");
        validate_input(&input)?;

        let category = self.find_category(&input.category).ok_or_else(|| {
            AppError::Integrity(format!(
                "category {} does not match any category id or name",
                input.category
            ))
        })?;
        self.require_staff(&input.coach_id, "coach_id")?;

        let plan = ClassPlan {
            id: self.ids.next(ids::CLASS_PLAN),
            category_id: category.id,
            coach_id: input.coach_id,
            date: input.date,
            title: input.title,
            warm_up: input.warm_up,
            main: input.main,
            cool_down: input.cool_down,
            materials: input.materials,
            notes: input.notes,
        };
        info!(plan_id = %plan.id, total_minutes = plan.total_minutes(), "Class plan created");
        self.class_plans.push(plan.clone());

        Ok(plan)
    }

    pub fn list_class_plans(&self, category_id: Option<&str>, coach_id: Option<&str>) -> Vec<ClassPlan> {
        let mut plans: Vec<ClassPlan> = self
            .class_plans
            .iter()
            .filter(|p| category_id.is_none_or(|c| p.category_id == c))
            .filter(|p| coach_id.is_none_or(|c| p.coach_id == c))
            .cloned()
            .collect();

        plans.sort_by_key(|p| p.date);
        plans
    }

    #[instrument(skip(self))]
    pub fn delete_class_plan(&mut self, id: &str) -> Result<ClassPlan, AppError> {
        info!("Deleting class plan");
        remove_by_id(&mut self.class_plans, id, "Class plan", |p| p.id.as_str())
    }

    #[instrument(skip_all, fields(skill = %input.skill))]
    pub fn add_challenge_parameter(
        &mut self,
        input: NewChallengeParameter,
    ) -> Result<ChallengeParameter, AppError> {
        info!("Creating challenge parameter");
        validate_input(&input)?;

        let challenge = ChallengeParameter {
            id: self.ids.next(ids::CHALLENGE),
            skill: input.skill,
            name: input.name,
            description: input.description,
            difficulty_levels: input.difficulty_levels,
        };
        self.challenges.push(challenge.clone());

        Ok(challenge)
    }

    pub fn list_challenge_parameters(&self, skill: Option<&str>) -> Vec<ChallengeParameter> {
        self.challenges
            .iter()
            .filter(|c| skill.is_none_or(|s| c.skill.eq_ignore_ascii_case(s)))
            .cloned()
            .collect()
    }

    #[instrument(skip(self))]
    pub fn delete_challenge_parameter(&mut self, id: &str) -> Result<ChallengeParameter, AppError> {
        info!("Deleting challenge parameter");
        remove_by_id(&mut self.challenges, id, "Challenge parameter", |c| c.id.as_str())
    }

    #[instrument(skip_all, fields(name = %input.name))]
    pub fn add_tournament(&mut self, input: NewTournament) -> Result<Tournament, AppError> {
        info!("Creating tournament");
        validate_input(&input)?;

        for category_id in &input.category_ids {
            self.require_category_ref(category_id)?;
        }

        let tournament = Tournament {
            id: self.ids.next(ids::TOURNAMENT),
            name: input.name,
            date: input.date,
            location: input.location,
            category_ids: input.category_ids,
            status: input.status.unwrap_or(TournamentStatus::Upcoming),
        };
        self.tournaments.push(tournament.clone());

        Ok(tournament)
    }

    pub fn list_tournaments(&self) -> Vec<Tournament> {
        let mut tournaments = self.tournaments.clone();
        tournaments.sort_by_key(|t| t.date);
        tournaments
    }

    #[instrument(skip_all, fields(title = %input.title))]
    pub fn add_announcement(&mut self, input: NewAnnouncement) -> Result<Announcement, AppError> {
        info!("Publishing announcement");
        validate_input(&input)?;
        self.require_staff(&input.author_id, "author_id")?;

        let announcement = Announcement {
            id: self.ids.next(ids::ANNOUNCEMENT),
            title: input.title,
            content: input.content,
            published_on: input.published_on,
            author_id: input.author_id,
            audience: input.audience,
        };
        self.announcements.push(announcement.clone());

        Ok(announcement)
    }

    /// Newest first. An empty audience means everyone.
    pub fn list_announcements(&self, audience: Option<Role>) -> Vec<Announcement> {
        let mut announcements: Vec<Announcement> = self
            .announcements
            .iter()
            .filter(|a| {
                audience.is_none_or(|role| a.audience.is_empty() || a.audience.contains(&role))
            })
            .cloned()
            .collect();

        announcements.sort_by(|a, b| b.published_on.cmp(&a.published_on));
        announcements
    }

    #[instrument(skip(self))]
    pub fn delete_announcement(&mut self, id: &str) -> Result<Announcement, AppError> {
        info!("Deleting announcement");
        remove_by_id(&mut self.announcements, id, "Announcement", |a| a.id.as_str())
    }
}
