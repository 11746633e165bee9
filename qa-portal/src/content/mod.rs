//! Static page table for the learning content.
//!
//! Every entry is a signed-in GET route rendering one template with no inputs.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRoute {
    pub path: &'static str,
    /// Content template identifier.
    pub template: &'static str,
    pub title: &'static str,
    pub section: Section,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Main,
    Automation,
    Levels,
    Selenium,
    Java,
    Python,
    Tools,
}

impl Section {
    pub fn label(&self) -> &'static str {
        match self {
            Section::Main => "Home",
            Section::Automation => "Automation",
            Section::Levels => "Automation Levels",
            Section::Selenium => "Selenium",
            Section::Java => "Java",
            Section::Python => "Python",
            Section::Tools => "Automation Tools",
        }
    }
}

const fn page(
    path: &'static str,
    template: &'static str,
    title: &'static str,
    section: Section,
) -> PageRoute {
    PageRoute {
        path,
        template,
        title,
        section,
    }
}

/// Path of the page hosting the code generator widget.
pub const AI_TOOLS_PATH: &str = "/ai-tools";

pub const ROUTES: &[PageRoute] = &[
    page("/", "home.html", "Home", Section::Main),
    page("/manual", "manual.html", "Manual Testing", Section::Main),
    page(AI_TOOLS_PATH, "ai_tools.html", "AI Tools", Section::Main),
    page("/interview", "interview.html", "Interview Preparation", Section::Main),
    page("/blog", "blog.html", "Blog", Section::Main),
    page("/about", "about.html", "About", Section::Main),
    page("/automation", "automation/automation.html", "Automation Testing", Section::Automation),
    page("/automation/beginners", "automation/levels/beginnerlevel.html", "Beginner Level", Section::Levels),
    page("/automation/intermediate", "automation/levels/intermediatelevel.html", "Intermediate Level", Section::Levels),
    page("/automation/professional", "automation/levels/advancedlevel.html", "Professional Level", Section::Levels),
    page("/automation/selenium", "automation/tools/selenium/selenium.html", "Selenium", Section::Selenium),
    page("/automation/selenium/beginner", "automation/tools/selenium/beginnerlevel.html", "Selenium: Beginner", Section::Selenium),
    page("/automation/selenium/intermediate", "automation/tools/selenium/intermediatelevel.html", "Selenium: Intermediate", Section::Selenium),
    page("/automation/selenium/advanced", "automation/tools/selenium/advancedlevel.html", "Selenium: Advanced", Section::Selenium),
    page("/automation/java", "automation/tools/java/beginnerlevel.html", "Java for Testers", Section::Java),
    page("/automation/java/beginner", "automation/tools/java/beginnerlevel.html", "Java: Beginner", Section::Java),
    page("/automation/java/intermediate", "automation/tools/java/intermediatelevel.html", "Java: Intermediate", Section::Java),
    page("/automation/java/advanced", "automation/tools/java/advancedlevel.html", "Java: Advanced", Section::Java),
    page("/automation/python", "automation/tools/python/beginnerlevel.html", "Python for Testers", Section::Python),
    page("/automation/python/beginner", "automation/tools/python/beginnerlevel.html", "Python: Beginner", Section::Python),
    page("/automation/python/intermediate", "automation/tools/python/intermediatelevel.html", "Python: Intermediate", Section::Python),
    page("/automation/python/advanced", "automation/tools/python/advancedlevel.html", "Python: Advanced", Section::Python),
    page("/automation/xpath", "automation/tools/xpath.html", "XPath", Section::Tools),
    page("/automation/maven", "automation/tools/maven.html", "Maven", Section::Tools),
    page("/automation/cucumber", "automation/tools/cucumber.html", "Cucumber", Section::Tools),
    page("/automation/jenkins", "automation/tools/jenkins.html", "Jenkins", Section::Tools),
    page("/automation/git", "automation/tools/git.html", "Git", Section::Tools),
    page("/automation/docker", "automation/tools/docker.html", "Docker", Section::Tools),
    page("/automation/ci_cd", "automation/tools/ci_cd.html", "CI/CD", Section::Tools),
    page("/automation/allure", "automation/tools/allure.html", "Allure Reports", Section::Tools),
    page("/automation/pytest", "automation/tools/pytest.html", "pytest", Section::Tools),
    page("/automation/testng", "automation/tools/testng.html", "TestNG", Section::Tools),
    page("/automation/frameworks", "automation/tools/frameworks.html", "Test Frameworks", Section::Tools),
    page("/automation/postman", "automation/tools/postman.html", "Postman", Section::Tools),
    page("/automation/appium", "automation/tools/appium.html", "Appium", Section::Tools),
    page("/automation/rest-assured", "automation/tools/rest_assured.html", "REST Assured", Section::Tools),
    page("/automation/playwright", "automation/tools/playwright.html", "Playwright", Section::Tools),
];

pub fn lookup(path: &str) -> Option<&'static PageRoute> {
    ROUTES.iter().find(|route| route.path == path)
}

/// Pages of one section, in table order.
pub fn section_pages(section: Section) -> impl Iterator<Item = &'static PageRoute> {
    ROUTES.iter().filter(move |route| route.section == section)
}
