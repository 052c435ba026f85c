use trustgate_application::{
    ApplicationInput, ApplicationRepository, OrganisationRepository, SeededOrganisation,
};

use super::*;

#[async_trait]
impl OrganisationRepository for InMemoryIdentityStore {
    async fn find_organisation(
        &self,
        organisation_id: OrganisationId,
    ) -> AppResult<Option<Organisation>> {
        Ok(self
            .state
            .read()
            .await
            .organisations
            .get(&organisation_id)
            .cloned())
    }

    async fn list_organisations(
        &self,
        organisation_ids: &[OrganisationId],
    ) -> AppResult<Vec<Organisation>> {
        let state = self.state.read().await;
        let mut organisations: Vec<Organisation> = organisation_ids
            .iter()
            .filter_map(|organisation_id| state.organisations.get(organisation_id).cloned())
            .collect();
        organisations.sort_by(|left, right| {
            left.name.cmp(&right.name).then(left.id.cmp(&right.id))
        });
        organisations.dedup_by_key(|organisation| organisation.id);

        Ok(organisations)
    }

    async fn create_organisation(
        &self,
        name: &str,
        default_role_name: &str,
    ) -> AppResult<SeededOrganisation> {
        let organisation = Organisation {
            id: OrganisationId::new(),
            name: name.to_owned(),
        };
        let default_role = Role {
            id: RoleId::new(),
            organisation_id: organisation.id,
            name: default_role_name.to_owned(),
            permission_ids: Vec::new(),
            application_ids: Vec::new(),
        };

        let mut state = self.state.write().await;
        state
            .organisations
            .insert(organisation.id, organisation.clone());
        state.roles.insert(default_role.id, default_role.clone());

        Ok(SeededOrganisation {
            organisation,
            default_role,
        })
    }

    async fn rename_organisation(
        &self,
        organisation_id: OrganisationId,
        name: &str,
    ) -> AppResult<Organisation> {
        let mut state = self.state.write().await;
        let organisation = state
            .organisations
            .get_mut(&organisation_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("organisation '{organisation_id}' does not exist"))
            })?;
        organisation.name = name.to_owned();

        Ok(organisation.clone())
    }

    async fn list_installed_applications(
        &self,
        organisation_id: OrganisationId,
    ) -> AppResult<Vec<Application>> {
        let state = self.state.read().await;
        let mut applications: Vec<Application> = state
            .installations
            .iter()
            .filter(|(installed_in, _)| *installed_in == organisation_id)
            .filter_map(|(_, application_id)| state.applications.get(application_id).cloned())
            .collect();
        applications.sort_by(|left, right| left.slug.cmp(&right.slug));

        Ok(applications)
    }

    async fn install_application(
        &self,
        organisation_id: OrganisationId,
        application_id: ApplicationId,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        let installation = (organisation_id, application_id);
        if !state.installations.contains(&installation) {
            state.installations.push(installation);
        }

        Ok(())
    }

    async fn uninstall_application(
        &self,
        organisation_id: OrganisationId,
        application_id: ApplicationId,
    ) -> AppResult<()> {
        self.state
            .write()
            .await
            .installations
            .retain(|installation| *installation != (organisation_id, application_id));

        Ok(())
    }
}

fn slug_taken(
    applications: &HashMap<ApplicationId, Application>,
    input: &ApplicationInput,
    except: Option<ApplicationId>,
) -> bool {
    applications.values().any(|application| {
        Some(application.id) != except
            && (application.slug == input.slug
                || (input.public_key.is_some() && application.public_key == input.public_key))
    })
}

#[async_trait]
impl ApplicationRepository for InMemoryIdentityStore {
    async fn list_applications(
        &self,
        application_ids: Option<&[ApplicationId]>,
    ) -> AppResult<Vec<Application>> {
        let state = self.state.read().await;
        let mut applications: Vec<Application> = state.applications.values().cloned().collect();
        retain_requested(&mut applications, application_ids, |application| application.id);
        applications.sort_by(|left, right| left.slug.cmp(&right.slug));

        Ok(applications)
    }

    async fn find_application_by_slug(&self, slug: &str) -> AppResult<Option<Application>> {
        Ok(self
            .state
            .read()
            .await
            .applications
            .values()
            .find(|application| application.slug == slug)
            .cloned())
    }

    async fn find_application_by_public_key(
        &self,
        public_key: &str,
    ) -> AppResult<Option<Application>> {
        Ok(self
            .state
            .read()
            .await
            .applications
            .values()
            .find(|application| application.public_key.as_deref() == Some(public_key))
            .cloned())
    }

    async fn create_application(&self, input: ApplicationInput) -> AppResult<Application> {
        let mut state = self.state.write().await;
        if slug_taken(&state.applications, &input, None) {
            return Err(AppError::Conflict(
                "an application with this slug or public key already exists".to_owned(),
            ));
        }

        let application = Application {
            id: ApplicationId::new(),
            name: input.name,
            backend_url: input.backend_url,
            entrypoint: input.entrypoint,
            slug: input.slug,
            public_key: input.public_key,
        };
        state
            .applications
            .insert(application.id, application.clone());

        Ok(application)
    }

    async fn update_application(
        &self,
        application_id: ApplicationId,
        input: ApplicationInput,
    ) -> AppResult<Application> {
        let mut state = self.state.write().await;
        if slug_taken(&state.applications, &input, Some(application_id)) {
            return Err(AppError::Conflict(
                "an application with this slug or public key already exists".to_owned(),
            ));
        }

        let application = state.applications.get_mut(&application_id).ok_or_else(|| {
            AppError::NotFound(format!("application '{application_id}' does not exist"))
        })?;
        *application = Application {
            id: application_id,
            name: input.name,
            backend_url: input.backend_url,
            entrypoint: input.entrypoint,
            slug: input.slug,
            public_key: input.public_key,
        };

        Ok(application.clone())
    }

    async fn delete_application(&self, application_id: ApplicationId) -> AppResult<Application> {
        let mut state = self.state.write().await;
        let application = state.applications.remove(&application_id).ok_or_else(|| {
            AppError::NotFound(format!("application '{application_id}' does not exist"))
        })?;

        state
            .installations
            .retain(|(_, installed)| *installed != application_id);
        for role in state.roles.values_mut() {
            role.application_ids.retain(|id| *id != application_id);
        }
        for permission in state.permissions.values_mut() {
            if permission.scope == Some(application_id) {
                permission.scope = None;
            }
        }

        Ok(application)
    }
}
