use tracing::{info, instrument, warn};

use super::{Store, today, validate_input};
use crate::auth::{IssuedPassword, Role, verify_password};
use crate::error::AppError;
use crate::models::{
    Category, CoachProfile, Credentials, EnrolledCoach, EnrolledStudent, NOT_AVAILABLE, NewCoach,
    NewStudent, NewUser, ParentLink, Student, StudentDetails, StudentFilter, StudentUpdate,
    UNASSIGNED, User, UserUpdate,
};
use crate::stats::{age_on, fits_age_range};

/// Passwords for the accounts an enrollment creates: the student's, and the
/// parent's when the enrollment brings a new parent.
pub struct EnrollmentPasswords {
    pub student: IssuedPassword,
    pub parent: Option<IssuedPassword>,
}

impl EnrollmentPasswords {
    pub fn issue(input: &NewStudent, cost: u32) -> Result<Self, AppError> {
        let parent = match input.parent {
            ParentLink::New(_) => Some(IssuedPassword::generate(Role::Parent, cost)?),
            ParentLink::Existing { .. } => None,
        };

        Ok(Self {
            student: IssuedPassword::generate(Role::Student, cost)?,
            parent,
        })
    }
}

impl Store {
    #[instrument(skip(self))]
    pub fn get_user(&self, id: &str) -> Result<User, AppError> {
        info!("Fetching user by ID");
        self.users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("User", id))
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
            .cloned()
    }

    #[instrument(skip(self))]
    pub fn list_users(&self, role: Option<Role>, include_inactive: bool) -> Vec<User> {
        info!("Listing users");
        self.users
            .iter()
            .filter(|u| role.is_none_or(|r| u.role == r))
            .filter(|u| include_inactive || u.active)
            .cloned()
            .collect()
    }

    fn ensure_email_available(&self, email: &str, except: Option<&str>) -> Result<(), AppError> {
        let taken = self
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(email.trim()) && Some(u.id.as_str()) != except);

        if taken {
            return Err(AppError::Conflict(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        Ok(())
    }

    /// Admin and parent accounts. Students and coaches come with profile records and
    /// go through `add_new_student` / `add_new_coach`.
    pub fn add_user(&mut self, input: NewUser) -> Result<Credentials, AppError> {
        let issued = IssuedPassword::for_user(&input, self.bcrypt_cost)?;
        self.add_user_with(input, issued)
    }

    #[instrument(skip_all, fields(email = %input.email, role = %input.role))]
    pub fn add_user_with(
        &mut self,
        input: NewUser,
        issued: IssuedPassword,
    ) -> Result<Credentials, AppError> {
        info!("Creating new user");
        validate_input(&input)?;

        if matches!(input.role, Role::Student | Role::Coach) {
            return Err(AppError::Validation(format!(
                "{} accounts are created through their enrollment operation",
                input.role
            )));
        }

        self.ensure_email_available(&input.email, None)?;

        let id = self.ids.next(input.role.id_prefix());
        let email = input.email.trim().to_string();

        self.users.push(User {
            id: id.clone(),
            email: email.clone(),
            password_hash: issued.hash,
            role: input.role,
            first_name: input.first_name,
            last_name: input.last_name,
            phone: input.phone,
            active: true,
            created_on: today(),
        });

        Ok(Credentials {
            user_id: id,
            email,
            password: issued.password,
        })
    }

    #[instrument(skip(self, update))]
    pub fn update_user(&mut self, id: &str, update: UserUpdate) -> Result<User, AppError> {
        info!("Updating user");
        validate_input(&update)?;

        if let Some(email) = &update.email {
            self.ensure_email_available(email, Some(id))?;
        }

        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::not_found("User", id))?;

        if let Some(email) = update.email {
            user.email = email.trim().to_string();
        }
        if let Some(first_name) = update.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            user.last_name = last_name;
        }
        if update.phone.is_some() {
            user.phone = update.phone;
        }

        Ok(user.clone())
    }

    /// Deactivation is the only way accounts leave circulation. For students the
    /// enrollment counter of their category follows.
    #[instrument(skip(self))]
    pub fn set_user_active(&mut self, id: &str, active: bool) -> Result<User, AppError> {
        info!("Toggling user active status");
        let user = self.get_user(id)?;

        if user.active == active {
            return Ok(user);
        }

        if user.role == Role::Student {
            let category_id = self.require_student_ref(id)?.category_id.clone();

            if active {
                let category = self.require_category_ref(&category_id)?;
                if category.is_full() {
                    return Err(AppError::Validation(format!(
                        "Category {} is full ({} students)",
                        category.name, category.max_students
                    )));
                }
                self.adjust_enrollment(&category_id, 1);
            } else {
                self.adjust_enrollment(&category_id, -1);
            }

            if let Some(student) = self.students.iter_mut().find(|s| s.id == id) {
                student.active = active;
            }
        }

        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::not_found("User", id))?;
        user.active = active;

        Ok(user.clone())
    }

    /// `None` for unknown e-mails, wrong passwords and inactive accounts alike.
    #[instrument(skip(self, password))]
    pub fn verify_credentials(&self, email: &str, password: &str) -> Option<User> {
        info!("Verifying credentials");
        self.find_user_by_email(email)
            .filter(|u| u.active && verify_password(password, &u.password_hash))
    }

    /// Swaps in a password issued for the user's role with `IssuedPassword::generate`.
    #[instrument(skip(self, issued))]
    pub fn reset_password(
        &mut self,
        user_id: &str,
        issued: IssuedPassword,
    ) -> Result<Credentials, AppError> {
        info!("Resetting user password");
        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AppError::not_found("User", user_id))?;
        user.password_hash = issued.hash;

        Ok(Credentials {
            user_id: user.id.clone(),
            email: user.email.clone(),
            password: issued.password,
        })
    }

    fn adjust_enrollment(&mut self, category_id: &str, delta: i32) {
        if let Some(category) = self.categories.iter_mut().find(|c| c.id == category_id) {
            category.current_students = category.current_students.saturating_add_signed(delta);
        }
    }

    /// Creates the student account, the student record and, when asked to, the
    /// parent account, then bumps the category's enrollment counter.
    pub fn add_new_student(&mut self, input: NewStudent) -> Result<EnrolledStudent, AppError> {
        let passwords = EnrollmentPasswords::issue(&input, self.bcrypt_cost)?;
        self.add_new_student_with(input, passwords)
    }

    /// `add_new_student` with the account passwords already hashed.
    #[instrument(skip_all, fields(email = %input.email, category_id = %input.category_id))]
    pub fn add_new_student_with(
        &mut self,
        input: NewStudent,
        passwords: EnrollmentPasswords,
    ) -> Result<EnrolledStudent, AppError> {
        info!("Enrolling new student");
        validate_input(&input)?;

        let category = self.require_category_ref(&input.category_id)?;
        if category.is_full() {
            return Err(AppError::Validation(format!(
                "Category {} is full ({} students)",
                category.name, category.max_students
            )));
        }
        let age_range = category.age_range;

        self.ensure_email_available(&input.email, None)?;

        let enrollment_date = input.enrollment_date.unwrap_or_else(today);
        if input.date_of_birth > enrollment_date {
            return Err(AppError::Validation(
                "Date of birth is after the enrollment date".to_string(),
            ));
        }

        let age = age_on(input.date_of_birth, enrollment_date);
        let age_out_of_range = !fits_age_range(&age_range, input.date_of_birth, enrollment_date);
        if age_out_of_range {
            warn!(
                age,
                min = age_range.min,
                max = age_range.max,
                "Student age is outside the category range"
            );
        }

        let new_parent = match &input.parent {
            ParentLink::Existing { parent_id } => {
                self.require_user_with_role(parent_id, Role::Parent, "parent_id")?;
                None
            }
            ParentLink::New(parent) => {
                validate_input(parent)?;
                self.ensure_email_available(&parent.email, None)?;
                if parent.email.trim().eq_ignore_ascii_case(input.email.trim()) {
                    return Err(AppError::Conflict(
                        "Student and parent need different e-mail addresses".to_string(),
                    ));
                }
                Some(parent.clone())
            }
        };

        let EnrollmentPasswords {
            student: student_password,
            parent: parent_password,
        } = passwords;
        let parent_secret = match (new_parent, parent_password) {
            (Some(parent), Some(issued)) => Some((parent, issued.password, issued.hash)),
            (Some(_), None) => {
                return Err(AppError::Internal(
                    "No password was issued for the new parent".to_string(),
                ));
            }
            (None, _) => None,
        };

        let created_on = today();

        let (parent_id, parent_credentials) = match (parent_secret, &input.parent) {
            (Some((parent, password, password_hash)), _) => {
                let id = self.ids.next(Role::Parent.id_prefix());
                let email = parent.email.trim().to_string();

                self.users.push(User {
                    id: id.clone(),
                    email: email.clone(),
                    password_hash,
                    role: Role::Parent,
                    first_name: parent.first_name,
                    last_name: parent.last_name,
                    phone: parent.phone,
                    active: true,
                    created_on,
                });

                let credentials = Credentials {
                    user_id: id.clone(),
                    email,
                    password,
                };
                (id, Some(credentials))
            }
            (None, ParentLink::Existing { parent_id }) => (parent_id.clone(), None),
            (None, ParentLink::New(_)) => {
                return Err(AppError::Internal(
                    "Parent credentials missing for a new parent".to_string(),
                ));
            }
        };

        let student_id = self.ids.next(Role::Student.id_prefix());
        let email = input.email.trim().to_string();

        self.users.push(User {
            id: student_id.clone(),
            email: email.clone(),
            password_hash: student_password.hash,
            role: Role::Student,
            first_name: input.first_name,
            last_name: input.last_name,
            phone: input.phone,
            active: true,
            created_on,
        });

        self.students.push(Student {
            id: student_id.clone(),
            user_id: student_id.clone(),
            parent_id: parent_id.clone(),
            category_id: input.category_id.clone(),
            date_of_birth: input.date_of_birth,
            enrollment_date,
            active: true,
            medical_notes: input.medical_notes,
            emergency_contact: input.emergency_contact,
        });

        self.adjust_enrollment(&input.category_id, 1);

        info!(student_id = %student_id, parent_id = %parent_id, "Student enrolled");

        Ok(EnrolledStudent {
            student_id: student_id.clone(),
            parent_id,
            student_credentials: Credentials {
                user_id: student_id,
                email,
                password: student_password.password,
            },
            parent_credentials,
            age_at_enrollment: age,
            age_out_of_range,
        })
    }

    #[instrument(skip(self))]
    pub fn get_student(&self, id: &str) -> Result<Student, AppError> {
        info!("Fetching student by ID");
        self.students
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Student", id))
    }

    #[instrument(skip(self))]
    pub fn list_students(&self, filter: &StudentFilter) -> Vec<Student> {
        info!("Listing students");
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        self.students
            .iter()
            .filter(|s| filter.include_inactive || s.active)
            .filter(|s| {
                filter
                    .category_id
                    .as_deref()
                    .is_none_or(|c| s.category_id == c)
            })
            .filter(|s| filter.parent_id.as_deref().is_none_or(|p| s.parent_id == p))
            .filter(|s| match &search {
                Some(needle) => self.users.iter().any(|u| {
                    u.id == s.user_id
                        && (u.full_name().to_lowercase().contains(needle)
                            || u.email.to_lowercase().contains(needle))
                }),
                None => true,
            })
            .cloned()
            .collect()
    }

    #[instrument(skip(self))]
    pub fn students_of_parent(&self, parent_id: &str) -> Result<Vec<Student>, AppError> {
        info!("Listing students of parent");
        self.require_user_with_role(parent_id, Role::Parent, "parent_id")
            .map_err(|_| AppError::not_found("Parent", parent_id))?;

        Ok(self
            .students
            .iter()
            .filter(|s| s.parent_id == parent_id)
            .cloned()
            .collect())
    }

    /// Moving a student to another category re-checks capacity and moves the
    /// enrollment counters with it.
    #[instrument(skip(self, update))]
    pub fn update_student(&mut self, id: &str, update: StudentUpdate) -> Result<Student, AppError> {
        info!("Updating student");
        validate_input(&update)?;
        let current = self.get_student(id)?;

        if let Some(parent_id) = &update.parent_id {
            self.require_user_with_role(parent_id, Role::Parent, "parent_id")?;
        }

        let moving_to = match &update.category_id {
            Some(category_id) if *category_id != current.category_id => {
                let category = self.require_category_ref(category_id)?;
                if current.active && category.is_full() {
                    return Err(AppError::Validation(format!(
                        "Category {} is full ({} students)",
                        category.name, category.max_students
                    )));
                }
                Some(category_id.clone())
            }
            _ => None,
        };

        if let Some(date_of_birth) = update.date_of_birth {
            if date_of_birth > current.enrollment_date {
                return Err(AppError::Validation(
                    "Date of birth is after the enrollment date".to_string(),
                ));
            }
        }

        if let Some(category_id) = &moving_to {
            if current.active {
                self.adjust_enrollment(&current.category_id, -1);
                self.adjust_enrollment(category_id, 1);
            }
        }

        let student = self
            .students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::not_found("Student", id))?;

        if let Some(category_id) = moving_to {
            student.category_id = category_id;
        }
        if let Some(parent_id) = update.parent_id {
            student.parent_id = parent_id;
        }
        if let Some(date_of_birth) = update.date_of_birth {
            student.date_of_birth = date_of_birth;
        }
        if update.medical_notes.is_some() {
            student.medical_notes = update.medical_notes;
        }
        if update.emergency_contact.is_some() {
            student.emergency_contact = update.emergency_contact;
        }

        Ok(student.clone())
    }

    pub fn set_student_active(&mut self, id: &str, active: bool) -> Result<Student, AppError> {
        self.require_student_ref(id)
            .map_err(|_| AppError::not_found("Student", id))?;
        self.set_user_active(id, active)?;
        self.get_student(id)
    }

    fn details_for(&self, student: &Student) -> StudentDetails {
        let user = self.users.iter().find(|u| u.id == student.user_id);
        let parent = self.users.iter().find(|u| u.id == student.parent_id);
        let category = self.categories.iter().find(|c| c.id == student.category_id);
        let coach = category
            .and_then(|c| c.coach_id.as_deref())
            .and_then(|coach_id| self.users.iter().find(|u| u.id == coach_id));

        StudentDetails {
            id: student.id.clone(),
            full_name: user
                .map(User::full_name)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            email: user
                .map(|u| u.email.clone())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            category_name: category
                .map(|c| c.name.clone())
                .unwrap_or_else(|| UNASSIGNED.to_string()),
            coach_name: coach
                .map(User::full_name)
                .unwrap_or_else(|| UNASSIGNED.to_string()),
            parent_name: parent
                .map(User::full_name)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            parent_email: parent
                .map(|p| p.email.clone())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            parent_phone: parent
                .and_then(|p| p.phone.clone())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            date_of_birth: student.date_of_birth,
            enrollment_date: student.enrollment_date,
            active: student.active,
        }
    }

    #[instrument(skip(self))]
    pub fn student_details(&self, id: &str) -> Result<StudentDetails, AppError> {
        let student = self
            .students
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::not_found("Student", id))?;

        Ok(self.details_for(student))
    }

    pub fn list_student_details(&self, filter: &StudentFilter) -> Vec<StudentDetails> {
        self.list_students(filter)
            .iter()
            .map(|s| self.details_for(s))
            .collect()
    }

    /// Creates the coach account and profile and takes over the listed categories.
    pub fn add_new_coach(&mut self, input: NewCoach) -> Result<EnrolledCoach, AppError> {
        let issued = IssuedPassword::generate(Role::Coach, self.bcrypt_cost)?;
        self.add_new_coach_with(input, issued)
    }

    #[instrument(skip_all, fields(email = %input.email))]
    pub fn add_new_coach_with(
        &mut self,
        input: NewCoach,
        issued: IssuedPassword,
    ) -> Result<EnrolledCoach, AppError> {
        info!("Registering new coach");
        validate_input(&input)?;
        self.ensure_email_available(&input.email, None)?;

        for category_id in &input.assigned_categories {
            self.require_category_ref(category_id)?;
        }

        let coach_id = self.ids.next(Role::Coach.id_prefix());
        let email = input.email.trim().to_string();

        self.users.push(User {
            id: coach_id.clone(),
            email: email.clone(),
            password_hash: issued.hash,
            role: Role::Coach,
            first_name: input.first_name,
            last_name: input.last_name,
            phone: input.phone,
            active: true,
            created_on: today(),
        });

        self.coaches.push(CoachProfile {
            id: coach_id.clone(),
            user_id: coach_id.clone(),
            specialization: input.specialization,
            experience: input.experience,
            certifications: input.certifications,
            assigned_categories: Vec::new(),
            bio: input.bio,
        });

        for category_id in &input.assigned_categories {
            self.link_coach(category_id, &coach_id);
        }

        info!(coach_id = %coach_id, "Coach registered");

        Ok(EnrolledCoach {
            coach_id: coach_id.clone(),
            credentials: Credentials {
                user_id: coach_id,
                email,
                password: issued.password,
            },
        })
    }

    #[instrument(skip(self))]
    pub fn get_coach(&self, id: &str) -> Result<CoachProfile, AppError> {
        info!("Fetching coach by ID");
        self.coaches
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Coach", id))
    }

    #[instrument(skip(self))]
    pub fn list_coaches(&self, include_inactive: bool) -> Vec<CoachProfile> {
        info!("Listing coaches");
        self.coaches
            .iter()
            .filter(|c| {
                include_inactive || self.users.iter().any(|u| u.id == c.user_id && u.active)
            })
            .cloned()
            .collect()
    }

    #[instrument(skip(self))]
    pub fn assign_coach_to_category(
        &mut self,
        category_id: &str,
        coach_id: &str,
    ) -> Result<Category, AppError> {
        info!("Assigning coach to category");
        self.require_category_ref(category_id)?;
        self.require_user_with_role(coach_id, Role::Coach, "coach_id")?;
        if !self.coaches.iter().any(|c| c.id == coach_id) {
            return Err(AppError::Integrity(format!(
                "coach_id {} has no coach profile",
                coach_id
            )));
        }

        self.link_coach(category_id, coach_id);
        self.get_category(category_id)
    }

    /// Points the category at the coach and keeps both coaches' assignment lists in step.
    pub(crate) fn link_coach(&mut self, category_id: &str, coach_id: &str) {
        let previous = self
            .categories
            .iter_mut()
            .find(|c| c.id == category_id)
            .and_then(|c| c.coach_id.replace(coach_id.to_string()));

        if let Some(previous) = previous {
            if let Some(profile) = self.coaches.iter_mut().find(|c| c.id == previous) {
                profile.assigned_categories.retain(|c| c != category_id);
            }
        }

        if let Some(profile) = self.coaches.iter_mut().find(|c| c.id == coach_id) {
            if !profile.assigned_categories.iter().any(|c| c == category_id) {
                profile.assigned_categories.push(category_id.to_string());
            }
        }
    }
}
